//! ECB (Electronic Codebook) mode of operation.
//!
//! **Warning**: ECB mode is insecure for most purposes because identical
//! plaintext blocks produce identical ciphertext blocks. It is provided
//! for interoperability with legacy formats.

use cryptcore_types::{CipherMode, CryptoError, PaddingMode};

use super::ModeParams;
use crate::provider::BlockCipher;

pub(crate) fn encrypt_blocks<C: BlockCipher + ?Sized>(
    cipher: &C,
    block_size: usize,
    data: &mut [u8],
) -> Result<(), CryptoError> {
    for block in data.chunks_exact_mut(block_size) {
        cipher.encrypt_block(block)?;
    }
    Ok(())
}

pub(crate) fn decrypt_blocks<C: BlockCipher + ?Sized>(
    cipher: &C,
    block_size: usize,
    data: &mut [u8],
) -> Result<(), CryptoError> {
    for block in data.chunks_exact_mut(block_size) {
        cipher.decrypt_block(block)?;
    }
    Ok(())
}

/// Encrypt a whole message in ECB mode.
pub fn ecb_encrypt<C: BlockCipher>(
    cipher: C,
    padding: PaddingMode,
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    ModeParams::new(CipherMode::Ecb)
        .with_padding(padding)
        .encryptor(cipher)?
        .transform_final_block(plaintext)
}

/// Decrypt a whole message in ECB mode and strip its padding.
pub fn ecb_decrypt<C: BlockCipher + Clone>(
    cipher: C,
    padding: PaddingMode,
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    ModeParams::new(CipherMode::Ecb)
        .with_padding(padding)
        .decryptor(cipher)?
        .transform_final_block(ciphertext)
}
