//! Trait-based provider mechanism for block cipher primitives.
//!
//! The modes of operation are generic over [`BlockCipher`]; a concrete
//! cipher (AES, DES, RC2, ...) only has to transform one block at a time.

use std::sync::Arc;

use cryptcore_types::CryptoError;

/// A keyed block cipher (e.g., AES).
///
/// Implementations hold an expanded key schedule and must be usable from
/// several transforms at once, hence `&self` methods and `Send + Sync`.
pub trait BlockCipher: Send + Sync {
    /// Block size in bytes.
    fn block_size(&self) -> usize;

    /// Encrypt a single block in-place. `block.len()` must equal
    /// [`block_size`](Self::block_size).
    fn encrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError>;

    /// Decrypt a single block in-place.
    fn decrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError>;
}

impl<T: BlockCipher + ?Sized> BlockCipher for Box<T> {
    fn block_size(&self) -> usize {
        (**self).block_size()
    }

    fn encrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        (**self).encrypt_block(block)
    }

    fn decrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        (**self).decrypt_block(block)
    }
}

/// Shared key schedules: cloning the `Arc` gives a second handle onto the
/// same key, which is how a CTS decryptor gets its keystream encryptor.
impl<T: BlockCipher + ?Sized> BlockCipher for Arc<T> {
    fn block_size(&self) -> usize {
        (**self).block_size()
    }

    fn encrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        (**self).encrypt_block(block)
    }

    fn decrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        (**self).decrypt_block(block)
    }
}
