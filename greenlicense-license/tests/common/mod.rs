//! Shared fixtures for license tests.

#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeZone, Utc};
use greenlicense_keys::{KeyAlgorithm, KeyPair, SecretKey};
use greenlicense_license::{LicenseKey, LicenseManager};
use greenlicense_store::{LicenseStore, MemoryStore};
use greenlicense_types::{KeyPairId, LicenseVersion, Software, SoftwareId};

/// Deterministic key pair with a fixed id.
pub fn key_pair(id: &str, seed: u8) -> KeyPair {
    KeyPair::from_parts(
        KeyPairId::new(id).unwrap(),
        "test signing key",
        KeyAlgorithm::Ed25519,
        256,
        SecretKey::from_bytes([seed; 32]),
    )
    .unwrap()
}

pub fn software(id: &str, key_pair: &KeyPair, version: LicenseVersion) -> Software {
    Software::with_id(
        SoftwareId::new(id).unwrap(),
        "Acme Tool",
        "1.0",
        key_pair.id().clone(),
        version,
    )
    .unwrap()
}

/// A fixed point in time tests treat as "now".
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// Compact token form of a raw envelope under the given tag.
pub fn token(tag: &str, envelope: &[u8]) -> String {
    format!("{tag}.{}", URL_SAFE_NO_PAD.encode(envelope))
}

/// Envelope bytes of a key with its signature replaced.
pub fn with_signature(key: &LicenseKey, signature: [u8; 64]) -> Vec<u8> {
    let mut bytes = key.signed_bytes().to_vec();
    bytes.extend_from_slice(&signature);
    bytes
}

/// Manager over an in-memory store holding key pair `k1` and software
/// `acme-tool` configured for `version`.
pub fn manager(version: LicenseVersion) -> LicenseManager<MemoryStore> {
    let manager = LicenseManager::new(MemoryStore::new());
    let pair = key_pair("k1", 7);
    let entry = software("acme-tool", &pair, version);
    manager.store().add_key_pair(pair).unwrap();
    manager.add_software(entry).unwrap();
    manager
}
