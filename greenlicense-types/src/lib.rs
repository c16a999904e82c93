//! Core type definitions for GreenLicense.
//!
//! This crate defines the records shared by the key, store, and license
//! crates:
//! - Software and key pair identifiers
//! - The license format revision a software entry issues keys in
//! - The registered [`Software`] record
//!
//! Key material lives in `greenlicense-keys`; nothing here is secret.

mod ids;
mod software;

pub use ids::{KeyPairId, MAX_ID_LEN, SoftwareId};
pub use software::{LicenseVersion, Software};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building core records.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("unknown license version: {0}")]
    UnknownLicenseVersion(String),
}
