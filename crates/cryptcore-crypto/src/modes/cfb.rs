//! CFB (Cipher Feedback) mode of operation.
//!
//! Byte oriented with a configurable segment size `k` (1 to the block size
//! in bytes): each segment is XORed with the first `k` bytes of `E(register)`
//! and its ciphertext is shifted into the register. `k = 1` is CFB8,
//! `k = block_size` is full-block CFB (CFB128 for AES).

use cryptcore_types::{CipherMode, CryptoError, Direction};

use super::transform::ChainState;
use super::ModeParams;
use crate::provider::BlockCipher;

/// Compute `E(iv)` into `temp[..block_size]` and restart the segment.
pub(crate) fn load_keystream<C: BlockCipher + ?Sized>(
    cipher: &C,
    state: &mut ChainState,
) -> Result<(), CryptoError> {
    let bs = state.block_size;
    state.temp[..bs].copy_from_slice(&state.iv);
    cipher.encrypt_block(&mut state.temp[..bs])?;
    state.temp_size = 0;
    Ok(())
}

pub(crate) fn apply_keystream<C: BlockCipher + ?Sized>(
    cipher: &C,
    state: &mut ChainState,
    direction: Direction,
    input: &[u8],
    output: &mut [u8],
) -> Result<(), CryptoError> {
    let bs = state.block_size;
    for (inb, outb) in input.iter().zip(output.iter_mut()) {
        let pos = state.temp_size;
        *outb = inb ^ state.temp[pos];
        state.temp[bs + pos] = match direction {
            Direction::Encrypt => *outb,
            Direction::Decrypt => *inb,
        };
        state.temp_size += 1;
        if state.temp_size == state.feedback_size {
            shift_register(cipher, state)?;
        }
    }
    Ok(())
}

/// Shift the finished segment's ciphertext into the register.
fn shift_register<C: BlockCipher + ?Sized>(
    cipher: &C,
    state: &mut ChainState,
) -> Result<(), CryptoError> {
    let bs = state.block_size;
    let k = state.feedback_size;
    state.iv.copy_within(k.., 0);
    state.iv[bs - k..].copy_from_slice(&state.temp[bs..bs + k]);
    load_keystream(cipher, state)
}

/// Encrypt a whole message in CFB mode with a `feedback_size`-byte segment.
pub fn cfb_encrypt<C: BlockCipher>(
    cipher: C,
    iv: &[u8],
    feedback_size: usize,
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    ModeParams::new(CipherMode::Cfb)
        .with_iv(iv)
        .with_feedback_size(feedback_size)
        .encryptor(cipher)?
        .transform_final_block(plaintext)
}

/// Decrypt a whole message in CFB mode.
pub fn cfb_decrypt<C: BlockCipher + Clone>(
    cipher: C,
    iv: &[u8],
    feedback_size: usize,
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    ModeParams::new(CipherMode::Cfb)
        .with_iv(iv)
        .with_feedback_size(feedback_size)
        .decryptor(cipher)?
        .transform_final_block(ciphertext)
}
