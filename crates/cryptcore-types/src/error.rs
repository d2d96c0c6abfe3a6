/// Cryptographic and encoding errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    // General errors
    #[error("invalid argument")]
    InvalidArg,
    #[error("operation not supported")]
    NotSupported,
    #[error("invalid key")]
    InvalidKey,

    // Buffer errors
    #[error("buffer length not enough: need {need}, got {got}")]
    BufferTooSmall { need: usize, got: usize },

    // Symmetric cipher errors
    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },
    #[error("invalid iv length")]
    InvalidIvLength,
    #[error("input length {len} is not a multiple of the block size {block_size}")]
    NotBlockAligned { len: usize, block_size: usize },
    #[error("transform already finalized")]
    TransformFinalized,

    // ASN.1 errors
    #[error("asn1: malformed encoding")]
    Asn1Malformed,
    #[error("asn1: truncated input: need {need}, got {got}")]
    Asn1Truncated { need: usize, got: usize },
    #[error("asn1: unexpected tag: expected {expected:#04x}, found {found:#04x}")]
    Asn1UnexpectedTag { expected: u8, found: u8 },
    #[error("asn1: {remaining} bytes of trailing data")]
    Asn1TrailingData { remaining: usize },
}

impl CryptoError {
    /// Returns true for any of the ASN.1 decoding errors.
    ///
    /// Callers that only care about "invalid ASN.1 encoding" can use this
    /// instead of matching every variant.
    pub fn is_asn1(&self) -> bool {
        matches!(
            self,
            CryptoError::Asn1Malformed
                | CryptoError::Asn1Truncated { .. }
                | CryptoError::Asn1UnexpectedTag { .. }
                | CryptoError::Asn1TrailingData { .. }
        )
    }
}

/// Key material (de)serialization errors.
#[derive(Debug, thiserror::Error)]
pub enum PkiError {
    #[error("unsupported key format: {0}")]
    UnsupportedKeyFormat(String),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("private key material missing")]
    MissingPrivateKey,
    #[error("crypto error: {0}")]
    CryptoError(#[from] CryptoError),
}
