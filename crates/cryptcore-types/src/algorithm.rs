use core::fmt;
use core::str::FromStr;

use crate::CryptoError;

/// Block cipher mode of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherMode {
    /// Electronic codebook.
    Ecb,
    /// Cipher block chaining.
    Cbc,
    /// Cipher feedback (byte oriented, configurable feedback size).
    Cfb,
    /// Output feedback.
    Ofb,
    /// CBC with ciphertext stealing.
    Cts,
}

impl CipherMode {
    /// Whether this mode needs an initialization vector.
    pub fn requires_iv(self) -> bool {
        !matches!(self, CipherMode::Ecb)
    }

    /// Whether the mode turns the block cipher into a byte-granular stream.
    pub fn is_stream(self) -> bool {
        matches!(self, CipherMode::Cfb | CipherMode::Ofb)
    }
}

impl fmt::Display for CipherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CipherMode::Ecb => "ecb",
            CipherMode::Cbc => "cbc",
            CipherMode::Cfb => "cfb",
            CipherMode::Ofb => "ofb",
            CipherMode::Cts => "cts",
        };
        f.write_str(name)
    }
}

impl FromStr for CipherMode {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ecb" => Ok(CipherMode::Ecb),
            "cbc" => Ok(CipherMode::Cbc),
            "cfb" => Ok(CipherMode::Cfb),
            "ofb" => Ok(CipherMode::Ofb),
            "cts" => Ok(CipherMode::Cts),
            _ => Err(CryptoError::NotSupported),
        }
    }
}

/// Padding applied to the final block of ECB and CBC messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaddingMode {
    /// Input must already be block aligned.
    None,
    /// Zero bytes up to the next block boundary; nothing added when aligned.
    Zeros,
    /// PKCS#7: `n` bytes of value `n`, always at least one byte.
    #[default]
    Pkcs7,
}

impl fmt::Display for PaddingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaddingMode::None => "none",
            PaddingMode::Zeros => "zeros",
            PaddingMode::Pkcs7 => "pkcs7",
        };
        f.write_str(name)
    }
}

impl FromStr for PaddingMode {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(PaddingMode::None),
            "zeros" | "zero" => Ok(PaddingMode::Zeros),
            "pkcs7" => Ok(PaddingMode::Pkcs7),
            _ => Err(CryptoError::NotSupported),
        }
    }
}

/// Which way a transform runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Encrypt => f.write_str("encrypt"),
            Direction::Decrypt => f.write_str("decrypt"),
        }
    }
}
