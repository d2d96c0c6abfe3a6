//! CBC with ciphertext stealing (CBC-CS3).
//!
//! Output is exactly as long as the input. For messages longer than one
//! block the final two ciphertext blocks are always swapped, and the last
//! one is truncated to the length of the final partial plaintext block.
//! A message shorter than one block is XORed with `E(iv)` instead.

use cryptcore_types::{CipherMode, CryptoError};

use super::transform::ChainState;
use super::{cbc, xor_in_place, ModeParams};
use crate::provider::BlockCipher;

/// Encrypt the final `data` (everything the transform held back) in place.
pub(crate) fn encrypt_final<C: BlockCipher + ?Sized>(
    cipher: &C,
    state: &mut ChainState,
    data: &mut [u8],
) -> Result<(), CryptoError> {
    let bs = state.block_size;
    let n = data.len();
    if n == 0 {
        return Ok(());
    }
    if n < bs {
        return xor_keystream(cipher, state, data);
    }
    if n == bs {
        return cbc::encrypt_blocks(cipher, &mut state.iv, data);
    }

    let head = (n - 1) / bs * bs - bs;
    let d = n - head - bs;
    cbc::encrypt_blocks(cipher, &mut state.iv, &mut data[..head])?;

    let (prev, last) = data[head..].split_at_mut(bs);
    xor_in_place(prev, &state.iv);
    cipher.encrypt_block(prev)?;

    let stolen = &mut state.temp[..bs];
    stolen[..d].copy_from_slice(last);
    stolen[d..].fill(0);
    xor_in_place(stolen, prev);
    cipher.encrypt_block(stolen)?;

    last.copy_from_slice(&prev[..d]);
    prev.copy_from_slice(stolen);
    Ok(())
}

/// Decrypt the final `data` in place. `keystream` encrypts for the
/// sub-block case.
pub(crate) fn decrypt_final<C: BlockCipher + ?Sized>(
    cipher: &C,
    keystream: Option<&C>,
    state: &mut ChainState,
    data: &mut [u8],
) -> Result<(), CryptoError> {
    let bs = state.block_size;
    let n = data.len();
    if n == 0 {
        return Ok(());
    }
    if n < bs {
        let keystream = keystream.ok_or(CryptoError::InvalidArg)?;
        return xor_keystream(keystream, state, data);
    }
    if n == bs {
        return cbc::decrypt_blocks(cipher, &mut state.iv, data);
    }

    let head = (n - 1) / bs * bs - bs;
    let d = n - head - bs;
    cbc::decrypt_blocks(cipher, &mut state.iv, &mut data[..head])?;

    // `full` is the swapped-in final block, `tail` the truncated one.
    let (full, tail) = data[head..].split_at_mut(bs);
    let (z, stolen) = state.temp[..2 * bs].split_at_mut(bs);
    z.copy_from_slice(full);
    cipher.decrypt_block(z)?;

    // Rebuild the penultimate ciphertext block from the tail and the
    // stolen bytes.
    stolen[..d].copy_from_slice(tail);
    stolen[d..].copy_from_slice(&z[d..]);

    xor_in_place(tail, z);

    full.copy_from_slice(stolen);
    cipher.decrypt_block(full)?;
    xor_in_place(full, &state.iv);
    Ok(())
}

fn xor_keystream<C: BlockCipher + ?Sized>(
    cipher: &C,
    state: &mut ChainState,
    data: &mut [u8],
) -> Result<(), CryptoError> {
    let bs = state.block_size;
    let block = &mut state.temp[..bs];
    block.copy_from_slice(&state.iv);
    cipher.encrypt_block(block)?;
    xor_in_place(data, block);
    Ok(())
}

/// Encrypt a whole message with ciphertext stealing.
pub fn cts_encrypt<C: BlockCipher>(
    cipher: C,
    iv: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    ModeParams::new(CipherMode::Cts)
        .with_iv(iv)
        .encryptor(cipher)?
        .transform_final_block(plaintext)
}

/// Decrypt a whole message with ciphertext stealing.
pub fn cts_decrypt<C: BlockCipher + Clone>(
    cipher: C,
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    ModeParams::new(CipherMode::Cts)
        .with_iv(iv)
        .decryptor(cipher)?
        .transform_final_block(ciphertext)
}
