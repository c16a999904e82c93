//! Public key material and signature verification.

use crate::error::{KeyError, KeyResult};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use ed25519_dalek::{Signature, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Size of an Ed25519 public key in bytes.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Size of an Ed25519 signature in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// An Ed25519 public key that has been checked to be a valid curve point.
///
/// The exported form is the 32 raw bytes in unpadded base64url. It carries no
/// version marker and does not depend on the license format.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey([u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    /// Parses raw public key bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the length is wrong or the bytes are not a valid
    /// Ed25519 point.
    pub fn from_bytes(bytes: &[u8]) -> KeyResult<Self> {
        let bytes: [u8; PUBLIC_KEY_LEN] = bytes.try_into().map_err(|_| {
            KeyError::InvalidPublicKey(format!(
                "expected {PUBLIC_KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        VerifyingKey::from_bytes(&bytes)
            .map_err(|_| KeyError::InvalidPublicKey("not a valid Ed25519 point".to_string()))?;
        Ok(Self(bytes))
    }

    pub(crate) fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self(key.to_bytes())
    }

    /// Parses the exported base64url form.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not base64url or not a valid key.
    pub fn from_exported(text: &str) -> KeyResult<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(text.trim())
            .map_err(|e| KeyError::InvalidPublicKey(format!("invalid base64: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Returns the exported base64url form.
    #[must_use]
    pub fn export(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    /// Returns the raw public key bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LEN] {
        self.0
    }

    /// Short hex fingerprint (first 8 bytes of SHA-256) for listings.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0);
        hex::encode(&digest[..8])
    }

    /// Verifies an Ed25519 signature over `message`.
    ///
    /// Every failure, including a signature of the wrong length, is reported
    /// as [`KeyError::SignatureInvalid`].
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> KeyResult<()> {
        let signature = Signature::from_slice(signature).map_err(|_| KeyError::SignatureInvalid)?;
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| KeyError::SignatureInvalid)?;
        verifying_key
            .verify_strict(message, &signature)
            .map_err(|_| KeyError::SignatureInvalid)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.export()).finish()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.export())
    }
}

impl TryFrom<String> for PublicKey {
    type Error = KeyError;

    fn try_from(value: String) -> KeyResult<Self> {
        Self::from_exported(&value)
    }
}

impl From<PublicKey> for String {
    fn from(key: PublicKey) -> Self {
        key.export()
    }
}
