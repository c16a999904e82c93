//! License key issuance and offline verification.
//!
//! This crate handles:
//! - Canonical claim encoding for each license format revision
//! - Signing claims with a software entry's key pair
//! - Offline verification against an exported public key
//! - Resolving software and key pairs through an injected store
//!
//! # License Key Format
//!
//! A key is `canonical_claims || ed25519_signature`, where the first byte of
//! the claims is the format revision. It is presented in one of two forms:
//!
//! - manual entry: `GL2-ABCDE-FGHJK-...` (grouped base32, no I/O/0/1)
//! - compact token: `GL2.<base64url>`
//!
//! # Verification
//!
//! Verification runs a fixed sequence of gates and stops at the first
//! failure: version tag, structural decode, software identity, signature,
//! expiry. Each gate has its own [`LicenseError`] variant so callers can tell
//! an expired license from a forged one.

mod claims;
pub mod codec;
mod error;
mod issuer;
mod key;
mod manager;
mod text;
mod verifier;

pub use claims::{ClaimExtension, IssueRequest, LicenseClaims};
pub use error::{ErrorKind, LicenseError, LicenseResult};
pub use issuer::issue;
pub use key::{KEY_TAG_PREFIX, LicenseKey};
pub use manager::LicenseManager;
pub use verifier::{VerificationResult, verify, verify_now};
