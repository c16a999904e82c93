//! License key issuance.

use crate::codec::encode_claims;
use crate::{IssueRequest, LicenseClaims, LicenseError, LicenseKey, LicenseResult};
use chrono::{DateTime, Utc};
use greenlicense_keys::KeyPair;
use greenlicense_types::Software;
use tracing::debug;

/// Issues a license key for `software`, signed with `key_pair`.
///
/// The key pair must be the one the software entry references. The claim set
/// follows the software's configured license version.
///
/// # Errors
///
/// - [`LicenseError::KeyMismatch`] if the key pair belongs to other software
/// - [`LicenseError::UnsupportedClaimForVersion`] for a customer or expiry on V1
/// - [`LicenseError::InvalidClaim`] for an empty customer or an oversized field
pub fn issue(
    software: &Software,
    key_pair: &KeyPair,
    request: &IssueRequest,
) -> LicenseResult<LicenseKey> {
    if key_pair.id() != software.key_pair_id() {
        return Err(LicenseError::KeyMismatch {
            software_id: software.id().clone(),
            expected: software.key_pair_id().clone(),
            actual: key_pair.id().clone(),
        });
    }

    let claims = build_claims(software, request)?;
    let signed_bytes = encode_claims(&claims)?;
    let signature = key_pair.sign(&signed_bytes);

    debug!(
        software_id = %software.id(),
        key_pair_id = %key_pair.id(),
        version = %claims.version,
        claims_len = signed_bytes.len(),
        "Issued license key"
    );
    Ok(LicenseKey::from_parts(claims, signed_bytes, signature))
}

fn build_claims(software: &Software, request: &IssueRequest) -> LicenseResult<LicenseClaims> {
    let version = software.license_version();
    let id = software.id().clone();

    if !version.supports_extended_claims() {
        if request.customer.is_some() {
            return Err(LicenseError::UnsupportedClaimForVersion {
                claim: "customer",
                version,
            });
        }
        if request.expires_at.is_some() {
            return Err(LicenseError::UnsupportedClaimForVersion {
                claim: "expires_at",
                version,
            });
        }
        return Ok(LicenseClaims::v1(id, software.version()));
    }

    let mut claims = LicenseClaims::v2(id, software.version()).with_software_name(software.name());
    if let Some(customer) = &request.customer {
        let customer = customer.trim();
        if customer.is_empty() {
            return Err(LicenseError::InvalidClaim {
                claim: "customer",
                reason: "must not be empty".to_string(),
            });
        }
        claims = claims.with_customer(customer);
    }
    if let Some(expires_at) = request.expires_at {
        claims = claims.with_expiry(whole_seconds(expires_at)?);
    }
    Ok(claims)
}

fn whole_seconds(at: DateTime<Utc>) -> LicenseResult<DateTime<Utc>> {
    DateTime::from_timestamp(at.timestamp(), 0).ok_or_else(|| LicenseError::InvalidClaim {
        claim: "expires_at",
        reason: "out of range".to_string(),
    })
}
