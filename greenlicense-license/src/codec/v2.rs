use super::{ClaimCodec, Reader, check_text_claim, decode_software_id, decode_utf8};
use crate::{ClaimExtension, LicenseClaims, LicenseError, LicenseResult};
use chrono::{DateTime, Utc};
use greenlicense_types::{LicenseVersion, MAX_ID_LEN};

const TAG_SOFTWARE_ID: u8 = 0x01;
const TAG_SOFTWARE_VERSION: u8 = 0x02;
const TAG_SOFTWARE_NAME: u8 = 0x03;
const TAG_CUSTOMER: u8 = 0x04;
const TAG_EXPIRES_AT: u8 = 0x05;
/// Lowest tag carried as an uninterpreted extension.
pub const FIRST_EXTENSION_TAG: u8 = 0x06;

const MAX_VALUE_LEN: usize = u16::MAX as usize;

/// Tagged layout: `0x02 | (tag:u8 | len:u16 | value)*`, tags strictly ascending.
#[derive(Debug, Clone, Copy, Default)]
pub struct V2Codec;

impl ClaimCodec for V2Codec {
    fn version(&self) -> LicenseVersion {
        LicenseVersion::V2
    }

    fn encode(&self, claims: &LicenseClaims) -> LicenseResult<Vec<u8>> {
        if claims.version != LicenseVersion::V2 {
            return Err(LicenseError::InvalidClaim {
                claim: "version",
                reason: format!("{} claims passed to the V2 codec", claims.version),
            });
        }

        let mut out = vec![LicenseVersion::V2.as_u8()];

        let id = claims.software_id.as_str();
        check_text_claim("software_id", id, MAX_ID_LEN)?;
        put_field(&mut out, TAG_SOFTWARE_ID, id.as_bytes());

        check_text_claim("software_version", &claims.software_version, MAX_VALUE_LEN)?;
        put_field(&mut out, TAG_SOFTWARE_VERSION, claims.software_version.as_bytes());

        if let Some(name) = &claims.software_name {
            check_text_claim("software_name", name, MAX_VALUE_LEN)?;
            put_field(&mut out, TAG_SOFTWARE_NAME, name.as_bytes());
        }
        if let Some(customer) = &claims.customer {
            check_text_claim("customer", customer, MAX_VALUE_LEN)?;
            put_field(&mut out, TAG_CUSTOMER, customer.as_bytes());
        }
        if let Some(expires_at) = claims.expires_at {
            if expires_at.timestamp_subsec_nanos() != 0 {
                return Err(LicenseError::InvalidClaim {
                    claim: "expires_at",
                    reason: "must be a whole number of seconds".to_string(),
                });
            }
            put_field(&mut out, TAG_EXPIRES_AT, &expires_at.timestamp().to_be_bytes());
        }

        let mut last_tag = TAG_EXPIRES_AT;
        for ext in &claims.extensions {
            if ext.tag < FIRST_EXTENSION_TAG || ext.tag <= last_tag {
                return Err(LicenseError::InvalidClaim {
                    claim: "extensions",
                    reason: format!("tag {:#04x} is reserved, repeated or out of order", ext.tag),
                });
            }
            if ext.value.len() > MAX_VALUE_LEN {
                return Err(LicenseError::InvalidClaim {
                    claim: "extensions",
                    reason: format!("tag {:#04x} value is too long", ext.tag),
                });
            }
            put_field(&mut out, ext.tag, &ext.value);
            last_tag = ext.tag;
        }

        Ok(out)
    }

    fn decode(&self, bytes: &[u8]) -> LicenseResult<LicenseClaims> {
        let mut reader = Reader::new(bytes);
        let version = reader.u8("version byte")?;
        if version != LicenseVersion::V2.as_u8() {
            return Err(LicenseError::malformed(format!(
                "expected V2 claims, found version byte {version}"
            )));
        }

        let mut software_id = None;
        let mut software_version = None;
        let mut software_name = None;
        let mut customer = None;
        let mut expires_at = None;
        let mut extensions = Vec::new();
        let mut last_tag = None;

        while !reader.is_empty() {
            let tag = reader.u8("claim tag")?;
            if tag == 0 {
                return Err(LicenseError::malformed("reserved claim tag 0x00"));
            }
            if last_tag.is_some_and(|last| tag <= last) {
                return Err(LicenseError::malformed(format!(
                    "claim tag {tag:#04x} is repeated or out of order"
                )));
            }
            last_tag = Some(tag);

            let len = reader.u16("claim length")?;
            let value = reader.take(len.into(), "claim value")?;
            match tag {
                TAG_SOFTWARE_ID => software_id = Some(decode_software_id(value)?),
                TAG_SOFTWARE_VERSION => {
                    software_version = Some(decode_utf8(value, "software version")?);
                }
                TAG_SOFTWARE_NAME => software_name = Some(decode_utf8(value, "software name")?),
                TAG_CUSTOMER => customer = Some(decode_utf8(value, "customer")?),
                TAG_EXPIRES_AT => expires_at = Some(decode_timestamp(value)?),
                _ => extensions.push(ClaimExtension {
                    tag,
                    value: value.to_vec(),
                }),
            }
        }
        reader.finish()?;

        let software_id =
            software_id.ok_or_else(|| LicenseError::malformed("missing software id claim"))?;
        let software_version = software_version
            .ok_or_else(|| LicenseError::malformed("missing software version claim"))?;

        Ok(LicenseClaims {
            version: LicenseVersion::V2,
            software_id,
            software_version,
            software_name,
            customer,
            expires_at,
            extensions,
        })
    }
}

fn put_field(out: &mut Vec<u8>, tag: u8, value: &[u8]) {
    out.push(tag);
    // Callers bound every value by MAX_VALUE_LEN.
    out.extend_from_slice(&(value.len() as u16).to_be_bytes());
    out.extend_from_slice(value);
}

fn decode_timestamp(value: &[u8]) -> LicenseResult<DateTime<Utc>> {
    let raw: [u8; 8] = value
        .try_into()
        .map_err(|_| LicenseError::malformed("expiry must be exactly 8 bytes"))?;
    DateTime::from_timestamp(i64::from_be_bytes(raw), 0)
        .ok_or_else(|| LicenseError::malformed("expiry is out of range"))
}
