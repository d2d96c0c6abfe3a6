#![forbid(unsafe_code)]
#![doc = "Block cipher primitives and modes of operation for cryptcore."]

// Core traits
pub mod provider;

// Block ciphers
#[cfg(feature = "aes")]
pub mod aes;

// Modes of operation
#[cfg(feature = "modes")]
pub mod modes;

pub mod cipher {
    //! Unified block cipher interface.
    pub use super::provider::BlockCipher;
}
