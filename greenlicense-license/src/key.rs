//! Signed license keys and their text forms.

use crate::codec::decode_claims;
use crate::{LicenseClaims, LicenseError, LicenseResult, text};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use greenlicense_keys::SIGNATURE_LEN;
use greenlicense_types::LicenseVersion;
use std::fmt;
use std::str::FromStr;

/// Prefix of the version tag that starts every license key text.
pub const KEY_TAG_PREFIX: &str = "GL";

/// Separator after the tag in the manual-entry form.
const TEXT_SEPARATOR: char = '-';
/// Separator after the tag in the compact token form.
const TOKEN_SEPARATOR: char = '.';

/// A signed license key: canonical claims plus the signature over them.
#[derive(Clone, PartialEq, Eq)]
pub struct LicenseKey {
    claims: LicenseClaims,
    signed_bytes: Vec<u8>,
    signature: [u8; SIGNATURE_LEN],
}

impl LicenseKey {
    pub(crate) fn from_parts(
        claims: LicenseClaims,
        signed_bytes: Vec<u8>,
        signature: [u8; SIGNATURE_LEN],
    ) -> Self {
        Self {
            claims,
            signed_bytes,
            signature,
        }
    }

    /// Parses a key in either text form.
    ///
    /// Only structure is checked here; use [`crate::verify`] to check the
    /// signature, identity and expiry.
    pub fn parse(text: &str) -> LicenseResult<Self> {
        let (version, envelope) = split_tagged(text)?;
        let key = Self::from_bytes(&envelope)?;
        if key.version() != version {
            return Err(LicenseError::malformed(format!(
                "tag {KEY_TAG_PREFIX}{} does not match encoded version {}",
                version.as_u8(),
                key.version().as_u8()
            )));
        }
        Ok(key)
    }

    /// Splits a binary envelope into claims and signature.
    pub fn from_bytes(bytes: &[u8]) -> LicenseResult<Self> {
        let claims_len = bytes
            .len()
            .checked_sub(SIGNATURE_LEN)
            .filter(|len| *len > 0)
            .ok_or_else(|| LicenseError::malformed("missing signature"))?;
        let (signed, signature) = bytes.split_at(claims_len);
        let claims = decode_claims(signed)?;
        let signature: [u8; SIGNATURE_LEN] = signature
            .try_into()
            .map_err(|_| LicenseError::malformed("missing signature"))?;
        Ok(Self::from_parts(claims, signed.to_vec(), signature))
    }

    pub fn claims(&self) -> &LicenseClaims {
        &self.claims
    }

    pub fn version(&self) -> LicenseVersion {
        self.claims.version
    }

    /// The canonical claim bytes the signature covers.
    pub fn signed_bytes(&self) -> &[u8] {
        &self.signed_bytes
    }

    pub fn signature(&self) -> &[u8; SIGNATURE_LEN] {
        &self.signature
    }

    /// Binary envelope: `claims || signature`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.signed_bytes.len() + SIGNATURE_LEN);
        out.extend_from_slice(&self.signed_bytes);
        out.extend_from_slice(&self.signature);
        out
    }

    /// Manual-entry form, e.g. `GL2-ABCDE-FGHJK-...`.
    pub fn to_text(&self) -> String {
        format!(
            "{}{TEXT_SEPARATOR}{}",
            version_tag(self.version()),
            text::encode(&self.to_bytes())
        )
    }

    /// Compact form, e.g. `GL2.AQNh...`.
    pub fn to_token(&self) -> String {
        format!(
            "{}{TOKEN_SEPARATOR}{}",
            version_tag(self.version()),
            URL_SAFE_NO_PAD.encode(self.to_bytes())
        )
    }
}

impl fmt::Display for LicenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for LicenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LicenseKey")
            .field("claims", &self.claims)
            .field("key", &self.to_text())
            .finish()
    }
}

impl FromStr for LicenseKey {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn version_tag(version: LicenseVersion) -> String {
    format!("{KEY_TAG_PREFIX}{}", version.as_u8())
}

/// Reads the `GL<n>` tag and decodes the body in the form its separator names.
///
/// A missing or garbled tag is malformed; a well-formed tag naming an
/// unsupported revision is [`LicenseError::UnknownVersion`].
pub(crate) fn split_tagged(text: &str) -> LicenseResult<(LicenseVersion, Vec<u8>)> {
    let text = text.trim();
    let sep_pos = text
        .find([TEXT_SEPARATOR, TOKEN_SEPARATOR])
        .ok_or_else(|| LicenseError::malformed("missing version tag"))?;
    let (tag, rest) = text.split_at(sep_pos);
    let tag = tag.trim();

    let digits = tag
        .get(..KEY_TAG_PREFIX.len())
        .filter(|prefix| prefix.eq_ignore_ascii_case(KEY_TAG_PREFIX))
        .map(|_| &tag[KEY_TAG_PREFIX.len()..])
        .ok_or_else(|| LicenseError::malformed("missing version tag"))?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LicenseError::malformed(format!("garbled version tag {tag:?}")));
    }
    let version = digits
        .parse::<u8>()
        .ok()
        .and_then(|n| LicenseVersion::try_from(n).ok())
        .ok_or_else(|| LicenseError::UnknownVersion(tag.to_ascii_uppercase()))?;

    let mut chars = rest.chars();
    let separator = chars.next();
    let body = chars.as_str();
    let envelope = if separator == Some(TOKEN_SEPARATOR) {
        let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
        URL_SAFE_NO_PAD
            .decode(compact)
            .map_err(|e| LicenseError::malformed(format!("invalid token encoding: {e}")))?
    } else {
        text::decode(body)?
    };
    Ok((version, envelope))
}
