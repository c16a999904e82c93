//! The registered software record and the license format it issues.

use crate::{Error, KeyPairId, Result, SoftwareId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Revision of the license key format a software entry issues keys in.
///
/// Both revisions stay verifiable forever; switching a software entry to a
/// newer revision only changes what new keys look like.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum LicenseVersion {
    /// Software id and version only.
    V1,
    #[default]
    /// Adds optional customer, expiry, and tagged extension fields.
    V2,
}

impl LicenseVersion {
    /// All supported revisions, oldest first.
    pub const ALL: [Self; 2] = [Self::V1, Self::V2];

    /// Returns the numeric tag written into encoded keys.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }

    /// Returns true if keys of this revision can carry customer and expiry claims.
    #[must_use]
    pub const fn supports_extended_claims(self) -> bool {
        matches!(self, Self::V2)
    }
}

impl TryFrom<u8> for LicenseVersion {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            other => Err(Error::UnknownLicenseVersion(other.to_string())),
        }
    }
}

impl From<LicenseVersion> for u8 {
    fn from(version: LicenseVersion) -> Self {
        version.as_u8()
    }
}

impl fmt::Display for LicenseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.as_u8())
    }
}

impl FromStr for LicenseVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        digits
            .parse::<u8>()
            .map_err(|_| Error::UnknownLicenseVersion(s.to_string()))
            .and_then(Self::try_from)
    }
}

/// A registered product that license keys are issued for.
///
/// The key pair is referenced by id only; removing a software entry never
/// removes its key pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SoftwareRecord")]
pub struct Software {
    id: SoftwareId,
    name: String,
    version: String,
    key_pair_id: KeyPairId,
    license_version: LicenseVersion,
}

impl Software {
    /// Registers a new software entry with a generated id.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or version is empty after trimming.
    pub fn register(
        name: &str,
        version: &str,
        key_pair_id: KeyPairId,
        license_version: LicenseVersion,
    ) -> Result<Self> {
        Self::with_id(
            SoftwareId::generate(),
            name,
            version,
            key_pair_id,
            license_version,
        )
    }

    /// Builds a software entry with an explicit id.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or version is empty after trimming.
    pub fn with_id(
        id: SoftwareId,
        name: &str,
        version: &str,
        key_pair_id: KeyPairId,
        license_version: LicenseVersion,
    ) -> Result<Self> {
        let name = non_empty("name", name)?;
        let version = non_empty("version", version)?;
        Ok(Self {
            id,
            name,
            version,
            key_pair_id,
            license_version,
        })
    }

    #[must_use]
    pub fn id(&self) -> &SoftwareId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the id of the key pair this software signs licenses with.
    #[must_use]
    pub fn key_pair_id(&self) -> &KeyPairId {
        &self.key_pair_id
    }

    /// Returns the format new license keys are issued in.
    #[must_use]
    pub fn license_version(&self) -> LicenseVersion {
        self.license_version
    }
}

/// Wire shape of [`Software`]; deserialized records pass through
/// [`Software::with_id`] so stored names and versions are trimmed and non-empty.
#[derive(Deserialize)]
struct SoftwareRecord {
    id: SoftwareId,
    name: String,
    version: String,
    key_pair_id: KeyPairId,
    license_version: LicenseVersion,
}

impl TryFrom<SoftwareRecord> for Software {
    type Error = Error;

    fn try_from(record: SoftwareRecord) -> Result<Self> {
        Self::with_id(
            record.id,
            &record.name,
            &record.version,
            record.key_pair_id,
            record.license_version,
        )
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidField {
            field,
            reason: "may not be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}
