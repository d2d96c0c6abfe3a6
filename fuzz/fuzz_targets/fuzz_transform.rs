#![no_main]
use cryptcore_crypto::aes::AesKey;
use cryptcore_crypto::modes::{CipherMode, ModeParams, PaddingMode};
use libfuzzer_sys::fuzz_target;

// First byte picks the mode and the chunk size; the rest is the message.
fuzz_target!(|data: &[u8]| {
    let Some((&selector, msg)) = data.split_first() else { return };
    let mode = match selector % 2 {
        0 => CipherMode::Cbc,
        _ => CipherMode::Cts,
    };
    let chunk = usize::from(selector >> 1) + 1;
    let key = AesKey::new(&[0x24u8; 16]).unwrap();
    let params = ModeParams::new(mode)
        .with_iv(&[0x42u8; 16])
        .with_padding(PaddingMode::Pkcs7);

    // Arbitrary ciphertext must never panic, chunked or not.
    let mut dec = params.decryptor(key.clone()).unwrap();
    let mut out = vec![0u8; chunk + 32];
    let mut streamed = Vec::new();
    let mut ok = true;
    for piece in msg.chunks(chunk) {
        match dec.transform_block(piece, &mut out) {
            Ok(n) => streamed.extend_from_slice(&out[..n]),
            Err(_) => {
                ok = false;
                break;
            }
        }
    }
    let whole = params.decryptor(key.clone()).unwrap().transform_final_block(msg);
    if ok {
        if let Ok(tail) = dec.transform_final_block(&[]) {
            streamed.extend_from_slice(&tail);
            assert_eq!(Some(&streamed), whole.as_ref().ok());
        }
    }

    // And encryption round-trips.
    let ct = params.encryptor(key.clone()).unwrap().transform_final_block(msg).unwrap();
    let pt = params.decryptor(key).unwrap().transform_final_block(&ct).unwrap();
    assert_eq!(pt, msg);
});
