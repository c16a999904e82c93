//! Offline license key verification.

use crate::key::split_tagged;
use crate::{LicenseClaims, LicenseError, LicenseKey, LicenseResult};
use chrono::{DateTime, Utc};
use greenlicense_keys::PublicKey;
use greenlicense_types::Software;
use tracing::debug;

/// Outcome of verification: the embedded claims when every gate passes.
pub type VerificationResult = LicenseResult<LicenseClaims>;

/// Verifies `text` for `software` against an exported public key.
///
/// Gates run in order and the first failure is returned:
///
/// 1. version tag ([`LicenseError::UnknownVersion`] or [`LicenseError::MalformedLicense`])
/// 2. structural decode ([`LicenseError::MalformedLicense`])
/// 3. software identity ([`LicenseError::SoftwareMismatch`])
/// 4. signature ([`LicenseError::SignatureInvalid`])
/// 5. expiry at `now` ([`LicenseError::Expired`])
///
/// The format comes from the key itself, so keys issued before a software
/// entry changed license version still verify.
pub fn verify(
    text: &str,
    software: &Software,
    public_key: &PublicKey,
    now: DateTime<Utc>,
) -> VerificationResult {
    let (version, envelope) = split_tagged(text)?;
    debug!(%version, software_id = %software.id(), "Detected license version");

    let key = LicenseKey::from_bytes(&envelope)?;
    if key.version() != version {
        return Err(LicenseError::malformed(format!(
            "version tag {version} does not match encoded {}",
            key.version()
        )));
    }

    let claims = key.claims();
    if &claims.software_id != software.id() {
        debug!(
            expected = %software.id(),
            actual = %claims.software_id,
            "License key names other software"
        );
        return Err(LicenseError::SoftwareMismatch {
            expected: software.id().clone(),
            actual: claims.software_id.clone(),
        });
    }

    public_key
        .verify(key.signed_bytes(), key.signature())
        .map_err(|_| LicenseError::SignatureInvalid)?;

    if let Some(expired_at) = claims.expires_at.filter(|_| claims.is_expired_at(now)) {
        debug!(%expired_at, "License key expired");
        return Err(LicenseError::Expired { expired_at });
    }

    debug!(software_id = %software.id(), "License key valid");
    Ok(key.claims().clone())
}

/// [`verify`] at the current time.
pub fn verify_now(text: &str, software: &Software, public_key: &PublicKey) -> VerificationResult {
    verify(text, software, public_key, Utc::now())
}
