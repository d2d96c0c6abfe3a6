//! Block cipher modes of operation.
//!
//! This module provides a streaming [`CipherTransform`] for ECB, CBC, CFB,
//! OFB and CTS (ciphertext stealing). A transform wraps any
//! [`BlockCipher`](crate::provider::BlockCipher), buffers partial blocks
//! between [`transform_block`](CipherTransform::transform_block) calls and
//! applies or strips padding in
//! [`transform_final_block`](CipherTransform::transform_final_block).
//!
//! Each mode module also exposes one-shot helpers for whole messages.

pub mod cbc;
pub mod cfb;
pub mod cts;
pub mod ecb;
pub mod ofb;
pub mod padding;
mod transform;

pub use cryptcore_types::{CipherMode, Direction, PaddingMode};
pub use transform::{CipherTransform, ModeParams};

/// XOR `src` into `dst` byte by byte. Extra bytes in either slice are ignored.
pub(crate) fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}
