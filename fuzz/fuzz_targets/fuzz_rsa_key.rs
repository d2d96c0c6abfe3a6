#![no_main]
use cryptcore_pki::rsa_key::RsaKeyParameters;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(key) = RsaKeyParameters::from_der(data) {
        // Whatever imports must re-import to the same key.
        let public = RsaKeyParameters::from_der(&key.to_public_der()).unwrap();
        assert_eq!(public, key.public_only());
        if let Ok(der) = key.to_private_der() {
            assert_eq!(RsaKeyParameters::from_der(&der).unwrap(), key);
        }
    }
});
