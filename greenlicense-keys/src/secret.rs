//! Private key material.

use crate::error::{KeyError, KeyResult};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of an Ed25519 secret key in bytes.
pub const SECRET_KEY_LEN: usize = 32;

/// Ed25519 secret key bytes, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: [u8; SECRET_KEY_LEN],
}

impl SecretKey {
    /// Wraps raw secret bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; SECRET_KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Copies secret bytes out of a slice, as read back from a store.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice is not exactly [`SECRET_KEY_LEN`] bytes.
    pub fn from_slice(bytes: &[u8]) -> KeyResult<Self> {
        let bytes: [u8; SECRET_KEY_LEN] =
            bytes.try_into().map_err(|_| KeyError::InvalidSecretKey {
                expected: SECRET_KEY_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self { bytes })
    }

    /// Returns the raw secret bytes.
    ///
    /// Only persistence code should call this.
    #[must_use]
    pub fn expose_bytes(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
