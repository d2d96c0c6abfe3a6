//! OFB (Output Feedback) mode of operation.
//!
//! The keystream is `E(iv), E(E(iv)), ...`, independent of the data, so
//! encryption and decryption are the same operation.

use cryptcore_types::{CipherMode, CryptoError, PaddingMode};

use super::transform::ChainState;
use super::ModeParams;
use crate::provider::BlockCipher;

/// Mark the keystream block as used up so the first byte pulls `E(iv)`.
pub(crate) fn reset(state: &mut ChainState) {
    state.temp_size = state.block_size;
}

pub(crate) fn apply_keystream<C: BlockCipher + ?Sized>(
    cipher: &C,
    state: &mut ChainState,
    input: &[u8],
    output: &mut [u8],
) -> Result<(), CryptoError> {
    let bs = state.block_size;
    for (inb, outb) in input.iter().zip(output.iter_mut()) {
        if state.temp_size == bs {
            cipher.encrypt_block(&mut state.iv)?;
            state.temp[..bs].copy_from_slice(&state.iv);
            state.temp_size = 0;
        }
        *outb = inb ^ state.temp[state.temp_size];
        state.temp_size += 1;
    }
    Ok(())
}

/// Encrypt or decrypt a whole message in OFB mode.
pub fn ofb_crypt<C: BlockCipher>(
    cipher: C,
    iv: &[u8],
    data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    ModeParams::new(CipherMode::Ofb)
        .with_iv(iv)
        .with_padding(PaddingMode::None)
        .encryptor(cipher)?
        .transform_final_block(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::test_cipher::ToyCipher;

    #[test]
    fn test_symmetric() {
        let cipher = ToyCipher::new(8);
        let iv = [0xC3u8; 8];
        let msg = b"output feedback is its own inverse";
        let ct = ofb_crypt(cipher.clone(), &iv, msg).unwrap();
        assert_eq!(ct.len(), msg.len());
        assert_eq!(ofb_crypt(cipher.clone(), &iv, &ct).unwrap(), msg);

        // The decryptor runs the same keystream.
        let mut dec = ModeParams::new(CipherMode::Ofb).with_iv(&iv).decryptor(cipher).unwrap();
        assert_eq!(dec.transform_final_block(&ct).unwrap(), msg);
    }

    #[test]
    fn test_keystream_independent_of_data() {
        let cipher = ToyCipher::new(8);
        let iv = [1u8; 8];
        let a = ofb_crypt(cipher.clone(), &iv, &[0u8; 20]).unwrap();
        let b = ofb_crypt(cipher, &iv, &[0xFFu8; 20]).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x ^ y, 0xFF);
        }
    }

    // NIST SP 800-38A F.4.1 OFB-AES128.Encrypt, first block plus a partial
    #[cfg(feature = "aes")]
    #[test]
    fn test_ofb_aes128_nist() {
        use crate::aes::AesKey;

        let key = AesKey::new(&hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap()).unwrap();
        let iv = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let pt = hex::decode("6bc1bee22e409f96e93d7e117393172aae2d8a57").unwrap();
        let ct = ofb_crypt(key, &iv, &pt).unwrap();
        assert_eq!(hex::encode(ct), "3b3fd92eb72dad20333449f8e83cfb4a7789508d");
    }
}
