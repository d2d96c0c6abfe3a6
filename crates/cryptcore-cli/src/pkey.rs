//! RSA key display/conversion command.

use std::fs;

use cryptcore_pki::rsa_key::{KeyFormat, RsaKeyParameters};

pub fn run(input: &str, text: bool, pubout: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let format = KeyFormat::detect(&data)?;
    let key = RsaKeyParameters::from_der(&data)?;

    println!(
        "RSA {} key, {} bits ({format})",
        if key.has_private() { "private" } else { "public" },
        key.modulus_bits()
    );
    if text {
        print_field("modulus", key.modulus());
        print_field("publicExponent", key.exponent());
        let private = [
            ("privateExponent", key.private_exponent()),
            ("prime1", key.prime1()),
            ("prime2", key.prime2()),
            ("exponent1", key.exponent1()),
            ("exponent2", key.exponent2()),
            ("coefficient", key.coefficient()),
        ];
        for (name, value) in private {
            if let Some(value) = value {
                print_field(name, value);
            }
        }
    }

    if let Some(path) = pubout {
        let spki = key.to_spki_der();
        fs::write(path, &spki)?;
        eprintln!("Wrote SubjectPublicKeyInfo ({} bytes) to {path}", spki.len());
    }

    Ok(())
}

fn print_field(name: &str, value: &[u8]) {
    println!("{name}:");
    for chunk in value.chunks(15) {
        let line: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        println!("    {}", line.join(":"));
    }
}
