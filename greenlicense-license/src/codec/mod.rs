//! Canonical claim encodings, one per license format revision.
//!
//! The first byte of every encoding is the revision number, so the decoder
//! for a blob is chosen from the blob itself with [`decode_claims`].

mod v1;
mod v2;

pub use v1::V1Codec;
pub use v2::{FIRST_EXTENSION_TAG, V2Codec};

use crate::{LicenseClaims, LicenseError, LicenseResult};
use greenlicense_types::{LicenseVersion, MAX_ID_LEN, SoftwareId};

/// Encodes and decodes the signed claim bytes for one license version.
pub trait ClaimCodec: Send + Sync {
    /// The revision this codec handles.
    fn version(&self) -> LicenseVersion;

    /// Encodes claims canonically. Equal claims always produce equal bytes.
    fn encode(&self, claims: &LicenseClaims) -> LicenseResult<Vec<u8>>;

    /// Decodes canonical bytes, including the leading version byte.
    fn decode(&self, bytes: &[u8]) -> LicenseResult<LicenseClaims>;
}

/// Returns the codec for a license version.
pub fn codec_for(version: LicenseVersion) -> &'static dyn ClaimCodec {
    match version {
        LicenseVersion::V1 => &V1Codec,
        LicenseVersion::V2 => &V2Codec,
    }
}

/// Encodes claims with the codec named by `claims.version`.
pub fn encode_claims(claims: &LicenseClaims) -> LicenseResult<Vec<u8>> {
    codec_for(claims.version).encode(claims)
}

/// Decodes claims with the codec named by the leading version byte.
pub fn decode_claims(bytes: &[u8]) -> LicenseResult<LicenseClaims> {
    let first = *bytes
        .first()
        .ok_or_else(|| LicenseError::malformed("empty claims"))?;
    let version = LicenseVersion::try_from(first)
        .map_err(|_| LicenseError::malformed(format!("unknown claims version byte {first}")))?;
    codec_for(version).decode(bytes)
}

/// Bounds-checked cursor over encoded claims.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub(crate) fn u8(&mut self, what: &str) -> LicenseResult<u8> {
        Ok(self.take(1, what)?[0])
    }

    pub(crate) fn u16(&mut self, what: &str) -> LicenseResult<u16> {
        let raw = self.take(2, what)?;
        Ok(u16::from_be_bytes([raw[0], raw[1]]))
    }

    pub(crate) fn take(&mut self, len: usize, what: &str) -> LicenseResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| LicenseError::malformed(format!("truncated {what}")))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn finish(self) -> LicenseResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(LicenseError::malformed(format!(
                "{} trailing bytes after claims",
                self.bytes.len() - self.pos
            )))
        }
    }
}

pub(crate) fn decode_utf8(bytes: &[u8], what: &str) -> LicenseResult<String> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| LicenseError::malformed(format!("{what} is not valid UTF-8")))?;
    if text.is_empty() {
        return Err(LicenseError::malformed(format!("{what} is empty")));
    }
    Ok(text.to_owned())
}

/// Decoded ids must already be in normalized form; anything else would let
/// two encodings name the same software.
pub(crate) fn decode_software_id(bytes: &[u8]) -> LicenseResult<SoftwareId> {
    let raw = decode_utf8(bytes, "software id")?;
    if raw.len() > MAX_ID_LEN || !SoftwareId::is_normalized(&raw) {
        return Err(LicenseError::malformed("software id is not normalized"));
    }
    SoftwareId::new(&raw).map_err(|e| LicenseError::malformed(e.to_string()))
}

pub(crate) fn check_text_claim(
    claim: &'static str,
    value: &str,
    max_len: usize,
) -> LicenseResult<()> {
    if value.is_empty() {
        return Err(LicenseError::InvalidClaim {
            claim,
            reason: "must not be empty".to_string(),
        });
    }
    if value.len() > max_len {
        return Err(LicenseError::InvalidClaim {
            claim,
            reason: format!("{} bytes exceeds the {max_len} byte limit", value.len()),
        });
    }
    Ok(())
}
