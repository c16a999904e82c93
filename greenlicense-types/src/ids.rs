//! Identifier types for software entries and key pairs.
//!
//! Both identifiers are opaque strings. Generated ids are UUID v7 strings so
//! that listings sort by creation time, but any caller-supplied id that passes
//! validation is accepted.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Longest identifier, in bytes, that fits the license wire formats.
pub const MAX_ID_LEN: usize = 255;

fn validate(raw: &str) -> Result<()> {
    if raw.is_empty() {
        return Err(Error::InvalidId("identifier may not be empty".to_string()));
    }
    if raw.len() > MAX_ID_LEN {
        return Err(Error::InvalidId(format!(
            "identifier is {} bytes, maximum is {MAX_ID_LEN}",
            raw.len()
        )));
    }
    if raw.chars().any(char::is_control) {
        return Err(Error::InvalidId(
            "identifier may not contain control characters".to_string(),
        ));
    }
    Ok(())
}

/// Unique identifier for a registered software entry.
///
/// Software ids are case-normalized: surrounding whitespace is trimmed and
/// the id is lower-cased, so `" Acme-Tool "` and `"acme-tool"` name the same
/// entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SoftwareId(String);

impl SoftwareId {
    /// Creates a new time-ordered software id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Normalizes and validates a caller-supplied id.
    pub fn new(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_lowercase();
        validate(&normalized)?;
        Ok(Self(normalized))
    }

    /// Returns true if `raw` is already in normalized form.
    #[must_use]
    pub fn is_normalized(raw: &str) -> bool {
        raw.trim() == raw && raw.to_lowercase() == raw
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SoftwareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SoftwareId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for SoftwareId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<SoftwareId> for String {
    fn from(id: SoftwareId) -> Self {
        id.0
    }
}

/// Unique identifier for a signing key pair.
///
/// Key pair ids are trimmed but otherwise kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyPairId(String);

impl KeyPairId {
    /// Creates a new time-ordered key pair id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Validates a caller-supplied id.
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        validate(trimmed)?;
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyPairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for KeyPairId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for KeyPairId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<KeyPairId> for String {
    fn from(id: KeyPairId) -> Self {
        id.0
    }
}
