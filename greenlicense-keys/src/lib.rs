//! Signing key pairs for GreenLicense.
//!
//! A [`KeyPair`] owns Ed25519 private key material and is the only type that
//! can sign. Everything a licensed application needs travels as a
//! [`PublicKey`], exported with [`KeyPair::export_public`] in a versionless
//! base64url form.
//!
//! Private key bytes are held in a zeroize-on-drop wrapper and the signing
//! key is only materialized for the duration of a [`KeyPair::sign`] call.

mod error;
mod pair;
mod public;
mod secret;

pub use error::{KeyError, KeyResult};
pub use pair::{KeyAlgorithm, KeyPair, KeyPairInfo, KeyParams};
pub use public::{PUBLIC_KEY_LEN, PublicKey, SIGNATURE_LEN};
pub use secret::{SECRET_KEY_LEN, SecretKey};
