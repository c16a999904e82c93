use super::{ClaimCodec, Reader, check_text_claim, decode_software_id, decode_utf8};
use crate::{LicenseClaims, LicenseError, LicenseResult};
use greenlicense_types::LicenseVersion;

/// Longest field a one-byte length prefix can describe.
const MAX_FIELD_LEN: usize = u8::MAX as usize;

/// Fixed layout: `0x01 | len:u8 | software_id | len:u8 | software_version`.
#[derive(Debug, Clone, Copy, Default)]
pub struct V1Codec;

impl ClaimCodec for V1Codec {
    fn version(&self) -> LicenseVersion {
        LicenseVersion::V1
    }

    fn encode(&self, claims: &LicenseClaims) -> LicenseResult<Vec<u8>> {
        if claims.version != LicenseVersion::V1 {
            return Err(LicenseError::InvalidClaim {
                claim: "version",
                reason: format!("{} claims passed to the V1 codec", claims.version),
            });
        }
        let unsupported = [
            ("software_name", claims.software_name.is_some()),
            ("customer", claims.customer.is_some()),
            ("expires_at", claims.expires_at.is_some()),
            ("extensions", !claims.extensions.is_empty()),
        ];
        if let Some((claim, _)) = unsupported.into_iter().find(|(_, present)| *present) {
            return Err(LicenseError::UnsupportedClaimForVersion {
                claim,
                version: LicenseVersion::V1,
            });
        }

        let id = claims.software_id.as_str();
        check_text_claim("software_id", id, MAX_FIELD_LEN)?;
        check_text_claim("software_version", &claims.software_version, MAX_FIELD_LEN)?;

        let mut out = Vec::with_capacity(3 + id.len() + claims.software_version.len());
        out.push(LicenseVersion::V1.as_u8());
        put_field(&mut out, id.as_bytes());
        put_field(&mut out, claims.software_version.as_bytes());
        Ok(out)
    }

    fn decode(&self, bytes: &[u8]) -> LicenseResult<LicenseClaims> {
        let mut reader = Reader::new(bytes);
        let version = reader.u8("version byte")?;
        if version != LicenseVersion::V1.as_u8() {
            return Err(LicenseError::malformed(format!(
                "expected V1 claims, found version byte {version}"
            )));
        }

        let len = reader.u8("software id length")?;
        let software_id = decode_software_id(reader.take(len.into(), "software id")?)?;
        let len = reader.u8("software version length")?;
        let software_version =
            decode_utf8(reader.take(len.into(), "software version")?, "software version")?;
        reader.finish()?;

        Ok(LicenseClaims::v1(software_id, software_version))
    }
}

fn put_field(out: &mut Vec<u8>, value: &[u8]) {
    // Length is checked against MAX_FIELD_LEN before encoding.
    out.push(value.len() as u8);
    out.extend_from_slice(value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenlicense_types::SoftwareId;

    #[test]
    fn layout_is_length_prefixed() {
        let claims = LicenseClaims::v1(SoftwareId::new("ab").unwrap(), "1.0");
        let bytes = V1Codec.encode(&claims).unwrap();
        assert_eq!(bytes, [0x01, 2, b'a', b'b', 3, b'1', b'.', b'0']);
    }

    #[test]
    fn trailing_byte_is_rejected() {
        let err = V1Codec.decode(&[0x01, 1, b'a', 1, b'1', 0xFF]).unwrap_err();
        assert!(matches!(err, LicenseError::MalformedLicense(_)));
    }
}
