//! Key pair generation, loading, and scoped signing.

use crate::error::{KeyError, KeyResult};
use crate::public::{PublicKey, SIGNATURE_LEN};
use crate::secret::{SECRET_KEY_LEN, SecretKey};
use ed25519_dalek::{Signer as _, SigningKey};
use greenlicense_types::KeyPairId;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;
use zeroize::Zeroizing;

/// Signature algorithm of a key pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAlgorithm {
    #[default]
    Ed25519,
}

impl KeyAlgorithm {
    /// Key strength in bits.
    #[must_use]
    pub const fn key_size(self) -> u32 {
        match self {
            Self::Ed25519 => 256,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ed25519 => "ed25519",
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyAlgorithm {
    type Err = KeyError;

    fn from_str(s: &str) -> KeyResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ed25519" => Ok(Self::Ed25519),
            other => Err(KeyError::InvalidField {
                field: "algorithm",
                reason: format!("unknown algorithm '{other}'"),
            }),
        }
    }
}

/// Parameters for generating a key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParams {
    /// Human-readable label.
    pub name: String,
    pub algorithm: KeyAlgorithm,
    /// Requested strength in bits; must match the algorithm.
    pub size: u32,
}

impl KeyParams {
    /// Parameters for a default-algorithm key with the given label.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let algorithm = KeyAlgorithm::default();
        Self {
            name: name.into(),
            algorithm,
            size: algorithm.key_size(),
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }
}

/// A signing key pair.
///
/// The private half never leaves this type except through
/// [`KeyPair::secret_key`], which exists for persistence. Signing goes
/// through [`KeyPair::sign`].
#[derive(Clone)]
pub struct KeyPair {
    id: KeyPairId,
    name: String,
    algorithm: KeyAlgorithm,
    size: u32,
    public_key: PublicKey,
    secret: SecretKey,
}

impl KeyPair {
    /// Generates a key pair from the operating system's CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::CryptoFailure`] if the randomness source is
    /// unavailable, or a validation error for bad parameters.
    pub fn generate(params: &KeyParams) -> KeyResult<Self> {
        Self::generate_with_rng(params, &mut OsRng)
    }

    /// Generates a key pair from the given CSPRNG.
    pub fn generate_with_rng<R: RngCore + CryptoRng>(
        params: &KeyParams,
        rng: &mut R,
    ) -> KeyResult<Self> {
        let name = validate_name(&params.name)?;
        validate_size(params.algorithm, params.size)?;

        let mut seed = Zeroizing::new([0u8; SECRET_KEY_LEN]);
        rng.try_fill_bytes(&mut seed[..])
            .map_err(|e| KeyError::CryptoFailure(format!("randomness source failed: {e}")))?;

        let pair = Self::assemble(
            KeyPairId::generate(),
            name,
            params.algorithm,
            params.size,
            SecretKey::from_bytes(*seed),
        );
        info!(key_pair_id = %pair.id, algorithm = %pair.algorithm, "Generated key pair");
        Ok(pair)
    }

    /// Rebuilds a stored key pair, deriving the public key from the secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or the size does not match the
    /// algorithm.
    pub fn from_parts(
        id: KeyPairId,
        name: &str,
        algorithm: KeyAlgorithm,
        size: u32,
        secret: SecretKey,
    ) -> KeyResult<Self> {
        let name = validate_name(name)?;
        validate_size(algorithm, size)?;
        Ok(Self::assemble(id, name, algorithm, size, secret))
    }

    fn assemble(
        id: KeyPairId,
        name: String,
        algorithm: KeyAlgorithm,
        size: u32,
        secret: SecretKey,
    ) -> Self {
        let signing_key = SigningKey::from_bytes(secret.expose_bytes());
        let public_key = PublicKey::from_verifying_key(&signing_key.verifying_key());
        Self {
            id,
            name,
            algorithm,
            size,
            public_key,
            secret,
        }
    }

    #[must_use]
    pub fn id(&self) -> &KeyPairId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Key strength in bits.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Returns the public key in its exported wire form.
    #[must_use]
    pub fn export_public(&self) -> String {
        self.public_key.export()
    }

    /// Returns the private key for persistence.
    #[must_use]
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    /// Returns the listing view of this key pair, without secret material.
    #[must_use]
    pub fn info(&self) -> KeyPairInfo {
        KeyPairInfo::new(
            self.id.clone(),
            self.name.clone(),
            self.algorithm,
            self.size,
            &self.public_key,
        )
    }

    /// Signs `message` with the private key.
    ///
    /// The signing key exists only inside this call and is zeroized when it
    /// goes out of scope.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LEN] {
        let signing_key = SigningKey::from_bytes(self.secret.expose_bytes());
        signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("algorithm", &self.algorithm)
            .field("size", &self.size)
            .field("public_key", &self.public_key)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Listing view of a key pair. Holds no secret material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPairInfo {
    pub id: KeyPairId,
    pub name: String,
    pub algorithm: KeyAlgorithm,
    pub size: u32,
    /// Exported public key.
    pub public_key: String,
    pub fingerprint: String,
}

impl KeyPairInfo {
    /// Builds the listing view from public parts only.
    pub fn new(
        id: KeyPairId,
        name: String,
        algorithm: KeyAlgorithm,
        size: u32,
        public_key: &PublicKey,
    ) -> Self {
        Self {
            id,
            name,
            algorithm,
            size,
            public_key: public_key.export(),
            fingerprint: public_key.fingerprint(),
        }
    }

    /// Parses the exported public key back.
    pub fn parse_public_key(&self) -> KeyResult<PublicKey> {
        PublicKey::from_exported(&self.public_key)
    }
}

fn validate_name(name: &str) -> KeyResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(KeyError::InvalidField {
            field: "name",
            reason: "may not be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn validate_size(algorithm: KeyAlgorithm, size: u32) -> KeyResult<()> {
    if size != algorithm.key_size() {
        return Err(KeyError::UnsupportedKeySize { algorithm, size });
    }
    Ok(())
}
