use greenlicense_types::{KeyPairId, MAX_ID_LEN, SoftwareId};
use std::collections::HashSet;
use std::str::FromStr;

// ── SoftwareId ────────────────────────────────────────────────────

#[test]
fn software_id_generate_is_unique() {
    let a = SoftwareId::generate();
    let b = SoftwareId::generate();
    assert_ne!(a, b);
}

#[test]
fn software_id_is_case_normalized() {
    let id = SoftwareId::new("  Acme-Tool ").unwrap();
    assert_eq!(id.as_str(), "acme-tool");
    assert_eq!(id, SoftwareId::new("ACME-TOOL").unwrap());
}

#[test]
fn software_id_generated_is_normalized() {
    let id = SoftwareId::generate();
    assert!(SoftwareId::is_normalized(id.as_str()));
}

#[test]
fn software_id_is_normalized_detects_case_and_whitespace() {
    assert!(SoftwareId::is_normalized("acme-tool"));
    assert!(!SoftwareId::is_normalized("Acme-tool"));
    assert!(!SoftwareId::is_normalized(" acme-tool"));
}

#[test]
fn software_id_rejects_empty() {
    assert!(SoftwareId::new("").is_err());
    assert!(SoftwareId::new("   ").is_err());
}

#[test]
fn software_id_rejects_too_long() {
    let long = "a".repeat(MAX_ID_LEN + 1);
    assert!(SoftwareId::new(&long).is_err());
    assert!(SoftwareId::new(&"a".repeat(MAX_ID_LEN)).is_ok());
}

#[test]
fn software_id_rejects_control_characters() {
    assert!(SoftwareId::new("acme\u{0}tool").is_err());
}

#[test]
fn software_id_from_str_and_display() {
    let id = SoftwareId::from_str("Acme").unwrap();
    assert_eq!(id.to_string(), "acme");
}

#[test]
fn software_id_serde_normalizes_on_read() {
    let parsed: SoftwareId = serde_json::from_str(r#""ACME""#).unwrap();
    assert_eq!(parsed.as_str(), "acme");
    assert!(serde_json::from_str::<SoftwareId>(r#""""#).is_err());
}

#[test]
fn software_id_hash_and_eq() {
    let mut set = HashSet::new();
    set.insert(SoftwareId::new("acme").unwrap());
    set.insert(SoftwareId::new("ACME").unwrap());
    assert_eq!(set.len(), 1);
}

// ── KeyPairId ─────────────────────────────────────────────────────

#[test]
fn key_pair_id_generate_is_unique() {
    assert_ne!(KeyPairId::generate(), KeyPairId::generate());
}

#[test]
fn key_pair_id_keeps_case_but_trims() {
    let id = KeyPairId::new(" K1 ").unwrap();
    assert_eq!(id.as_str(), "K1");
}

#[test]
fn key_pair_id_rejects_empty() {
    assert!(KeyPairId::new(" ").is_err());
}

#[test]
fn key_pair_id_serde_roundtrip() {
    let id = KeyPairId::new("k1").unwrap();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, r#""k1""#);
    let parsed: KeyPairId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

// ── Properties ────────────────────────────────────────────────────

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Normalizing an already normalized id is a no-op.
        #[test]
        fn software_id_normalization_is_idempotent(raw in "[A-Za-z0-9 ._-]{1,64}") {
            prop_assume!(!raw.trim().is_empty());
            let once = SoftwareId::new(&raw).unwrap();
            let twice = SoftwareId::new(once.as_str()).unwrap();
            prop_assert_eq!(&once, &twice);
            prop_assert!(SoftwareId::is_normalized(once.as_str()));
        }
    }
}
