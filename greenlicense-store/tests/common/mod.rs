//! Behaviour every store backend must share.

#![allow(dead_code)]

use greenlicense_keys::{KeyPair, KeyParams};
use greenlicense_store::{LicenseStore, StoreError};
use greenlicense_types::{KeyPairId, LicenseVersion, Software, SoftwareId};
use pretty_assertions::assert_eq;

pub fn key_pair(name: &str) -> KeyPair {
    KeyPair::generate(&KeyParams::new(name)).unwrap()
}

pub fn software_for(id: &str, key_pair_id: &KeyPairId) -> Software {
    Software::with_id(
        SoftwareId::new(id).unwrap(),
        "Acme Tool",
        "1.0",
        key_pair_id.clone(),
        LicenseVersion::V2,
    )
    .unwrap()
}

pub fn key_pair_roundtrip(store: &dyn LicenseStore) {
    let pair = key_pair("main");
    let info = store.add_key_pair(pair.clone()).unwrap();
    assert_eq!(info, pair.info());

    let loaded = store.get_key_pair(pair.id()).unwrap().unwrap();
    assert_eq!(loaded.info(), pair.info());
    assert_eq!(
        loaded.secret_key().expose_bytes(),
        pair.secret_key().expose_bytes()
    );
    let sig = loaded.sign(b"payload");
    assert!(pair.public_key().verify(b"payload", &sig).is_ok());
}

pub fn missing_records_are_none(store: &dyn LicenseStore) {
    assert!(
        store
            .get_key_pair(&KeyPairId::new("nope").unwrap())
            .unwrap()
            .is_none()
    );
    assert!(
        store
            .get_software(&SoftwareId::new("nope").unwrap())
            .unwrap()
            .is_none()
    );
}

pub fn duplicate_key_pair_rejected(store: &dyn LicenseStore) {
    let pair = key_pair("dup");
    store.add_key_pair(pair.clone()).unwrap();
    assert!(matches!(
        store.add_key_pair(pair),
        Err(StoreError::AlreadyExists(_))
    ));
}

pub fn software_roundtrip(store: &dyn LicenseStore) {
    let pair = key_pair("k");
    store.add_key_pair(pair.clone()).unwrap();
    let sw = software_for("acme-tool", pair.id());
    store.add_software(sw.clone()).unwrap();

    let loaded = store
        .get_software(&SoftwareId::new("ACME-TOOL").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(loaded, sw);
}

pub fn software_requires_known_key_pair(store: &dyn LicenseStore) {
    let missing = KeyPairId::new("ghost").unwrap();
    let err = store
        .add_software(software_for("orphan", &missing))
        .unwrap_err();
    assert!(matches!(err, StoreError::KeyPairNotFound(id) if id == missing));
    assert!(store.all_software().unwrap().is_empty());
}

pub fn duplicate_software_rejected(store: &dyn LicenseStore) {
    let pair = key_pair("k");
    store.add_key_pair(pair.clone()).unwrap();
    store.add_software(software_for("acme", pair.id())).unwrap();
    assert!(matches!(
        store.add_software(software_for("acme", pair.id())),
        Err(StoreError::AlreadyExists(_))
    ));
}

pub fn listings_are_ordered(store: &dyn LicenseStore) {
    let pair = key_pair("k");
    store.add_key_pair(pair.clone()).unwrap();
    for id in ["charlie", "alpha", "bravo"] {
        store.add_software(software_for(id, pair.id())).unwrap();
    }
    let ids: Vec<String> = store
        .all_software()
        .unwrap()
        .iter()
        .map(|s| s.id().to_string())
        .collect();
    assert_eq!(ids, vec!["alpha", "bravo", "charlie"]);
    assert_eq!(store.all_key_pairs().unwrap(), vec![pair.info()]);
}

pub fn referenced_key_pair_cannot_be_removed(store: &dyn LicenseStore) {
    let pair = key_pair("k");
    store.add_key_pair(pair.clone()).unwrap();
    store.add_software(software_for("b-app", pair.id())).unwrap();
    store.add_software(software_for("a-app", pair.id())).unwrap();

    match store.remove_key_pair(pair.id()) {
        Err(StoreError::KeyPairInUse {
            key_pair_id,
            software,
        }) => {
            assert_eq!(&key_pair_id, pair.id());
            let ids: Vec<&str> = software.iter().map(SoftwareId::as_str).collect();
            assert_eq!(ids, vec!["a-app", "b-app"]);
        }
        other => panic!("expected KeyPairInUse, got {other:?}"),
    }
    assert!(store.get_key_pair(pair.id()).unwrap().is_some());
}

pub fn removing_software_keeps_key_pair(store: &dyn LicenseStore) {
    let pair = key_pair("k");
    store.add_key_pair(pair.clone()).unwrap();
    let sw = software_for("acme", pair.id());
    store.add_software(sw.clone()).unwrap();

    let removed = store.remove_software(sw.id()).unwrap();
    assert_eq!(removed, sw);
    assert!(store.get_software(sw.id()).unwrap().is_none());
    assert!(store.get_key_pair(pair.id()).unwrap().is_some());

    let info = store.remove_key_pair(pair.id()).unwrap();
    assert_eq!(info, pair.info());
    assert!(store.get_key_pair(pair.id()).unwrap().is_none());
}

pub fn removing_missing_records_fails(store: &dyn LicenseStore) {
    assert!(matches!(
        store.remove_software(&SoftwareId::new("nope").unwrap()),
        Err(StoreError::SoftwareNotFound(_))
    ));
    assert!(matches!(
        store.remove_key_pair(&KeyPairId::new("nope").unwrap()),
        Err(StoreError::KeyPairNotFound(_))
    ));
}

pub fn generate_key_pair_stores_it(store: &dyn LicenseStore) {
    let info = store.generate_key_pair(&KeyParams::new("generated")).unwrap();
    let loaded = store.get_key_pair(&info.id).unwrap().unwrap();
    assert_eq!(loaded.info(), info);
    assert!(matches!(
        store.generate_key_pair(&KeyParams::new("bad").with_size(1024)),
        Err(StoreError::Key(_))
    ));
}

/// Runs every shared check against fresh stores from `make`.
pub fn public_lookups_skip_secret(store: &dyn LicenseStore) {
    let pair = key_pair("public");
    store.add_key_pair(pair.clone()).unwrap();

    assert_eq!(store.get_key_pair_info(pair.id()).unwrap(), Some(pair.info()));
    assert_eq!(store.get_public_key(pair.id()).unwrap(), Some(*pair.public_key()));

    let missing = KeyPairId::new("nope").unwrap();
    assert_eq!(store.get_key_pair_info(&missing).unwrap(), None);
    assert_eq!(store.get_public_key(&missing).unwrap(), None);
}

pub fn run_all<S: LicenseStore, F: Fn() -> S>(make: F) {
    key_pair_roundtrip(&make());
    missing_records_are_none(&make());
    duplicate_key_pair_rejected(&make());
    software_roundtrip(&make());
    software_requires_known_key_pair(&make());
    duplicate_software_rejected(&make());
    listings_are_ordered(&make());
    referenced_key_pair_cannot_be_removed(&make());
    removing_software_keeps_key_pair(&make());
    removing_missing_records_fails(&make());
    generate_key_pair_stores_it(&make());
    public_lookups_skip_secret(&make());
}
