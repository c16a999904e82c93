//! Error types for license issuance and verification.

use chrono::{DateTime, Utc};
use greenlicense_keys::KeyError;
use greenlicense_store::StoreError;
use greenlicense_types::{KeyPairId, LicenseVersion, SoftwareId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;

/// Licensing errors.
///
/// Verification failures are distinct variants so callers can respond
/// differently to, for example, [`LicenseError::Expired`] and
/// [`LicenseError::SignatureInvalid`].
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Randomness source or signature primitive failed.
    #[error("cryptographic failure: {0}")]
    CryptoFailure(String),

    /// The key pair is not the one the software entry references.
    #[error("key pair {actual} does not belong to software {software_id} (expects {expected})")]
    KeyMismatch {
        software_id: SoftwareId,
        expected: KeyPairId,
        actual: KeyPairId,
    },

    /// The claim cannot be carried by this license version.
    #[error("claim '{claim}' is not supported by license version {version}")]
    UnsupportedClaimForVersion {
        claim: &'static str,
        version: LicenseVersion,
    },

    /// A claim value does not fit the format.
    #[error("invalid claim '{claim}': {reason}")]
    InvalidClaim { claim: &'static str, reason: String },

    /// The key's version tag names no supported format.
    #[error("unknown license version: {0}")]
    UnknownVersion(String),

    /// The key failed structural decoding.
    #[error("malformed license key: {0}")]
    MalformedLicense(String),

    /// The key was issued for a different software entry.
    #[error("license key was issued for software {actual}, not {expected}")]
    SoftwareMismatch {
        expected: SoftwareId,
        actual: SoftwareId,
    },

    /// Ed25519 signature verification failed.
    #[error("license key signature invalid")]
    SignatureInvalid,

    /// License has expired.
    #[error("license expired on {expired_at}")]
    Expired { expired_at: DateTime<Utc> },

    /// The public key could not be parsed.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// A referenced software entry or key pair does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The key pair is still referenced by software.
    #[error("key pair {key_pair_id} is still used by {} software entries", .software.len())]
    KeyPairInUse {
        key_pair_id: KeyPairId,
        software: Vec<SoftwareId>,
    },

    /// A record with the same id already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Key pair parameters were rejected.
    #[error("invalid key pair: {0}")]
    InvalidKey(#[source] KeyError),

    /// The store failed.
    #[error("storage error: {0}")]
    Store(#[source] StoreError),

    /// Identifier or field validation failed.
    #[error(transparent)]
    Types(#[from] greenlicense_types::Error),
}

/// Serializable discriminant of [`LicenseError`], for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    CryptoFailure,
    KeyMismatch,
    UnsupportedClaimForVersion,
    InvalidClaim,
    UnknownVersion,
    MalformedLicense,
    SoftwareMismatch,
    SignatureInvalid,
    Expired,
    InvalidPublicKey,
    NotFound,
    KeyPairInUse,
    AlreadyExists,
    InvalidKey,
    Store,
    InvalidInput,
}

impl LicenseError {
    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CryptoFailure(_) => ErrorKind::CryptoFailure,
            Self::KeyMismatch { .. } => ErrorKind::KeyMismatch,
            Self::UnsupportedClaimForVersion { .. } => ErrorKind::UnsupportedClaimForVersion,
            Self::InvalidClaim { .. } => ErrorKind::InvalidClaim,
            Self::UnknownVersion(_) => ErrorKind::UnknownVersion,
            Self::MalformedLicense(_) => ErrorKind::MalformedLicense,
            Self::SoftwareMismatch { .. } => ErrorKind::SoftwareMismatch,
            Self::SignatureInvalid => ErrorKind::SignatureInvalid,
            Self::Expired { .. } => ErrorKind::Expired,
            Self::InvalidPublicKey(_) => ErrorKind::InvalidPublicKey,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::KeyPairInUse { .. } => ErrorKind::KeyPairInUse,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::InvalidKey(_) => ErrorKind::InvalidKey,
            Self::Store(_) => ErrorKind::Store,
            Self::Types(_) => ErrorKind::InvalidInput,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedLicense(reason.into())
    }
}

impl From<KeyError> for LicenseError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::CryptoFailure(msg) => Self::CryptoFailure(msg),
            KeyError::InvalidPublicKey(msg) => Self::InvalidPublicKey(msg),
            KeyError::SignatureInvalid => Self::SignatureInvalid,
            KeyError::Types(e) => Self::Types(e),
            other => Self::InvalidKey(other),
        }
    }
}

impl From<StoreError> for LicenseError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SoftwareNotFound(id) => Self::NotFound(format!("software {id}")),
            StoreError::KeyPairNotFound(id) => Self::NotFound(format!("key pair {id}")),
            StoreError::AlreadyExists(what) => Self::AlreadyExists(what),
            StoreError::KeyPairInUse {
                key_pair_id,
                software,
            } => Self::KeyPairInUse {
                key_pair_id,
                software,
            },
            StoreError::Key(e) => e.into(),
            StoreError::Types(e) => Self::Types(e),
            other => Self::Store(other),
        }
    }
}
