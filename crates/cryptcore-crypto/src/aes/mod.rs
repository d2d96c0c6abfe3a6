//! AES (Advanced Encryption Standard) block cipher.
//!
//! The round functions come from the RustCrypto `aes` crate; this module
//! adapts them to [`BlockCipher`] so they can drive the
//! [`modes`](crate::modes) engine.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use cryptcore_types::CryptoError;

use crate::provider::BlockCipher;

/// AES block size in bytes (128 bits).
pub const AES_BLOCK_SIZE: usize = 16;

/// Expanded key schedule. The RustCrypto types wipe themselves on drop.
#[derive(Clone)]
enum Schedule {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

/// An AES key with precomputed round keys.
#[derive(Clone)]
pub struct AesKey {
    schedule: Schedule,
}

impl AesKey {
    /// Create a new AES key from raw bytes.
    ///
    /// Accepts 16, 24, or 32-byte keys for AES-128, AES-192, and AES-256.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        let schedule = match key.len() {
            16 => Schedule::Aes128(Aes128::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?),
            24 => Schedule::Aes192(Aes192::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?),
            32 => Schedule::Aes256(Aes256::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?),
            got => {
                return Err(CryptoError::InvalidKeyLength {
                    expected: 16,
                    got,
                })
            }
        };
        Ok(Self { schedule })
    }

    /// Return the key length in bytes.
    pub fn key_len(&self) -> usize {
        match self.schedule {
            Schedule::Aes128(_) => 16,
            Schedule::Aes192(_) => 24,
            Schedule::Aes256(_) => 32,
        }
    }

    /// Encrypt a single 16-byte block in place.
    pub fn encrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        if block.len() != AES_BLOCK_SIZE {
            return Err(CryptoError::InvalidArg);
        }
        let block = GenericArray::from_mut_slice(block);
        match &self.schedule {
            Schedule::Aes128(c) => c.encrypt_block(block),
            Schedule::Aes192(c) => c.encrypt_block(block),
            Schedule::Aes256(c) => c.encrypt_block(block),
        }
        Ok(())
    }

    /// Decrypt a single 16-byte block in place.
    pub fn decrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        if block.len() != AES_BLOCK_SIZE {
            return Err(CryptoError::InvalidArg);
        }
        let block = GenericArray::from_mut_slice(block);
        match &self.schedule {
            Schedule::Aes128(c) => c.decrypt_block(block),
            Schedule::Aes192(c) => c.decrypt_block(block),
            Schedule::Aes256(c) => c.decrypt_block(block),
        }
        Ok(())
    }
}

impl BlockCipher for AesKey {
    fn block_size(&self) -> usize {
        AES_BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        AesKey::encrypt_block(self, block)
    }

    fn decrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        AesKey::decrypt_block(self, block)
    }
}
