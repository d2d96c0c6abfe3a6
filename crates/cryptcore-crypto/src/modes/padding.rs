//! Block padding for ECB and CBC messages.

use cryptcore_types::{CryptoError, PaddingMode};

/// Pad `data` in place up to a multiple of `block_size`.
///
/// - `None`: `data` must already be aligned.
/// - `Zeros`: zero bytes up to the next boundary, nothing when aligned.
/// - `Pkcs7`: `n` bytes of value `n`, `1 <= n <= block_size`, so aligned
///   input gains a full extra block.
pub fn pad(padding: PaddingMode, block_size: usize, data: &mut Vec<u8>) -> Result<(), CryptoError> {
    if block_size == 0 || block_size > 255 {
        return Err(CryptoError::InvalidArg);
    }
    let rem = data.len() % block_size;
    match padding {
        PaddingMode::None => {
            if rem != 0 {
                return Err(CryptoError::NotBlockAligned {
                    len: data.len(),
                    block_size,
                });
            }
        }
        PaddingMode::Zeros => {
            if rem != 0 {
                data.resize(data.len() + block_size - rem, 0);
            }
        }
        PaddingMode::Pkcs7 => {
            let n = block_size - rem;
            data.resize(data.len() + n, n as u8);
        }
    }
    Ok(())
}

/// Length of `data` once padding is removed.
///
/// `data` is a whole decrypted message (block aligned). A PKCS#7 pad byte of
/// zero or larger than the block size is read as a full block of padding;
/// zero stripping only looks at the final block.
pub fn unpadded_len(padding: PaddingMode, block_size: usize, data: &[u8]) -> usize {
    let Some(&last) = data.last() else {
        return 0;
    };
    match padding {
        PaddingMode::None => data.len(),
        PaddingMode::Zeros => {
            let last_block = &data[data.len().saturating_sub(block_size)..];
            let zeros = last_block.iter().rev().take_while(|&&b| b == 0).count();
            data.len() - zeros
        }
        PaddingMode::Pkcs7 => {
            let mut n = last as usize;
            if n == 0 || n > block_size {
                n = block_size;
            }
            data.len().saturating_sub(n)
        }
    }
}
