//! Base32 for hand-typed license keys.
//!
//! The alphabet drops I, O, 0 and 1 so keys survive being read aloud or
//! copied from print.

use crate::{LicenseError, LicenseResult};

const ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Characters per dash-separated group.
pub(crate) const GROUP_SIZE: usize = 5;

/// Encodes bytes as unpadded base32, grouped with dashes.
pub(crate) fn encode(bytes: &[u8]) -> String {
    let mut chars = Vec::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for &byte in bytes {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            chars.push(ALPHABET[((buffer >> bits) & 0x1F) as usize]);
        }
        buffer &= (1 << bits) - 1;
    }
    if bits > 0 {
        chars.push(ALPHABET[((buffer << (5 - bits)) & 0x1F) as usize]);
    }

    chars
        .chunks(GROUP_SIZE)
        .map(|group| group.iter().map(|&c| char::from(c)).collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

/// Decodes grouped base32. Case, dashes and whitespace are ignored.
pub(crate) fn decode(text: &str) -> LicenseResult<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;

    for c in text.chars().filter(|c| *c != '-' && !c.is_whitespace()) {
        let value = symbol_value(c)
            .ok_or_else(|| LicenseError::malformed(format!("invalid character {c:?}")))?;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    // A valid encoding leaves fewer than five zero padding bits.
    if bits >= 5 {
        return Err(LicenseError::malformed("impossible key length"));
    }
    if buffer != 0 {
        return Err(LicenseError::malformed("non-zero trailing bits"));
    }
    Ok(out)
}

fn symbol_value(c: char) -> Option<u32> {
    let upper = u8::try_from(c.to_ascii_uppercase()).ok()?;
    ALPHABET
        .iter()
        .position(|&symbol| symbol == upper)
        .map(|pos| pos as u32)
}
