//! Error types for key pair operations.

use crate::pair::KeyAlgorithm;
use thiserror::Error;

/// Result type for key operations.
pub type KeyResult<T> = Result<T, KeyError>;

/// Errors that can occur while creating, loading, or using key pairs.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The randomness source or signature primitive failed.
    #[error("cryptographic failure: {0}")]
    CryptoFailure(String),

    /// The requested size does not exist for the algorithm.
    #[error("unsupported key size for {algorithm}: {size} bits")]
    UnsupportedKeySize { algorithm: KeyAlgorithm, size: u32 },

    /// Public key bytes or text could not be parsed.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Stored secret key has the wrong length.
    #[error("invalid secret key length: expected {expected}, got {actual}")]
    InvalidSecretKey { expected: usize, actual: usize },

    /// Signature did not verify.
    #[error("signature invalid")]
    SignatureInvalid,

    /// A descriptive field (such as the name) was rejected.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Identifier validation failed.
    #[error(transparent)]
    Types(#[from] greenlicense_types::Error),
}
