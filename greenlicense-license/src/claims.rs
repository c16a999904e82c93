//! License claims and issuance requests.

use chrono::{DateTime, Utc};
use greenlicense_types::{LicenseVersion, SoftwareId};
use serde::{Deserialize, Serialize};

/// Facts embedded in a license key and protected by its signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseClaims {
    /// Format revision the claims were encoded with.
    pub version: LicenseVersion,
    pub software_id: SoftwareId,
    pub software_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Tagged fields this build does not interpret (V2 only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ClaimExtension>,
}

/// An uninterpreted V2 claim, kept so its bytes stay covered by the signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimExtension {
    pub tag: u8,
    pub value: Vec<u8>,
}

impl LicenseClaims {
    /// Claims for the fixed V1 layout.
    pub fn v1(software_id: SoftwareId, software_version: impl Into<String>) -> Self {
        Self::new(LicenseVersion::V1, software_id, software_version)
    }

    /// Claims for the tagged V2 layout.
    pub fn v2(software_id: SoftwareId, software_version: impl Into<String>) -> Self {
        Self::new(LicenseVersion::V2, software_id, software_version)
    }

    fn new(
        version: LicenseVersion,
        software_id: SoftwareId,
        software_version: impl Into<String>,
    ) -> Self {
        Self {
            version,
            software_id,
            software_version: software_version.into(),
            software_name: None,
            customer: None,
            expires_at: None,
            extensions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_software_name(mut self, name: impl Into<String>) -> Self {
        self.software_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }

    #[must_use]
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    #[must_use]
    pub fn with_extension(mut self, tag: u8, value: impl Into<Vec<u8>>) -> Self {
        self.extensions.push(ClaimExtension {
            tag,
            value: value.into(),
        });
        self
    }

    /// Whether the license is expired at `now`. Perpetual licenses never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    /// Whole days left before expiry, or `None` for a perpetual license.
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - now).num_days())
    }
}

/// Optional claims supplied when issuing a license.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl IssueRequest {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }

    #[must_use]
    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}
