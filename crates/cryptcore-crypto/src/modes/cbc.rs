//! CBC (Cipher Block Chaining) mode of operation.

use cryptcore_types::{CipherMode, CryptoError, PaddingMode};

use super::transform::MAX_BLOCK_SIZE;
use super::{xor_in_place, ModeParams};
use crate::provider::BlockCipher;

/// `C_i = E(P_i ^ C_{i-1})`; `iv` ends holding the last ciphertext block.
pub(crate) fn encrypt_blocks<C: BlockCipher + ?Sized>(
    cipher: &C,
    iv: &mut [u8],
    data: &mut [u8],
) -> Result<(), CryptoError> {
    for block in data.chunks_exact_mut(iv.len()) {
        xor_in_place(block, iv);
        cipher.encrypt_block(block)?;
        iv.copy_from_slice(block);
    }
    Ok(())
}

/// `P_i = D(C_i) ^ C_{i-1}`; `iv` ends holding the last ciphertext block.
pub(crate) fn decrypt_blocks<C: BlockCipher + ?Sized>(
    cipher: &C,
    iv: &mut [u8],
    data: &mut [u8],
) -> Result<(), CryptoError> {
    let mut scratch = [0u8; MAX_BLOCK_SIZE];
    let next_iv = scratch
        .get_mut(..iv.len())
        .ok_or(CryptoError::InvalidIvLength)?;
    for block in data.chunks_exact_mut(iv.len()) {
        next_iv.copy_from_slice(block);
        cipher.decrypt_block(block)?;
        xor_in_place(block, iv);
        iv.copy_from_slice(next_iv);
    }
    Ok(())
}

/// Encrypt a whole message in CBC mode.
pub fn cbc_encrypt<C: BlockCipher>(
    cipher: C,
    iv: &[u8],
    padding: PaddingMode,
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    ModeParams::new(CipherMode::Cbc)
        .with_iv(iv)
        .with_padding(padding)
        .encryptor(cipher)?
        .transform_final_block(plaintext)
}

/// Decrypt a whole message in CBC mode and strip its padding.
pub fn cbc_decrypt<C: BlockCipher + Clone>(
    cipher: C,
    iv: &[u8],
    padding: PaddingMode,
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    ModeParams::new(CipherMode::Cbc)
        .with_iv(iv)
        .with_padding(padding)
        .decryptor(cipher)?
        .transform_final_block(ciphertext)
}
