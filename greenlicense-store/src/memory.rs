//! In-memory store.

use crate::LicenseStore;
use crate::error::{StoreError, StoreResult};
use greenlicense_keys::{KeyPair, KeyPairInfo};
use greenlicense_types::{KeyPairId, Software, SoftwareId};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

#[derive(Default)]
struct Tables {
    software: BTreeMap<SoftwareId, Software>,
    key_pairs: BTreeMap<KeyPairId, KeyPair>,
}

impl Tables {
    fn referencing(&self, key_pair_id: &KeyPairId) -> Vec<SoftwareId> {
        self.software
            .values()
            .filter(|s| s.key_pair_id() == key_pair_id)
            .map(|s| s.id().clone())
            .collect()
    }
}

/// Process-local store.
///
/// Both tables sit behind one lock, so the referential checks and the write
/// they guard happen atomically.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl LicenseStore for MemoryStore {
    fn get_software(&self, id: &SoftwareId) -> StoreResult<Option<Software>> {
        Ok(self.read()?.software.get(id).cloned())
    }

    fn all_software(&self) -> StoreResult<Vec<Software>> {
        Ok(self.read()?.software.values().cloned().collect())
    }

    fn add_software(&self, software: Software) -> StoreResult<Software> {
        let mut tables = self.write()?;
        if !tables.key_pairs.contains_key(software.key_pair_id()) {
            return Err(StoreError::KeyPairNotFound(software.key_pair_id().clone()));
        }
        if tables.software.contains_key(software.id()) {
            return Err(StoreError::AlreadyExists(format!("software {}", software.id())));
        }
        tables
            .software
            .insert(software.id().clone(), software.clone());
        info!(
            software_id = %software.id(),
            key_pair_id = %software.key_pair_id(),
            "Added software"
        );
        Ok(software)
    }

    fn remove_software(&self, id: &SoftwareId) -> StoreResult<Software> {
        let removed = self
            .write()?
            .software
            .remove(id)
            .ok_or_else(|| StoreError::SoftwareNotFound(id.clone()))?;
        info!(software_id = %id, "Removed software");
        Ok(removed)
    }

    fn get_key_pair(&self, id: &KeyPairId) -> StoreResult<Option<KeyPair>> {
        Ok(self.read()?.key_pairs.get(id).cloned())
    }

    fn get_key_pair_info(&self, id: &KeyPairId) -> StoreResult<Option<KeyPairInfo>> {
        Ok(self.read()?.key_pairs.get(id).map(KeyPair::info))
    }

    fn all_key_pairs(&self) -> StoreResult<Vec<KeyPairInfo>> {
        Ok(self.read()?.key_pairs.values().map(KeyPair::info).collect())
    }

    fn add_key_pair(&self, key_pair: KeyPair) -> StoreResult<KeyPairInfo> {
        let mut tables = self.write()?;
        if tables.key_pairs.contains_key(key_pair.id()) {
            return Err(StoreError::AlreadyExists(format!("key pair {}", key_pair.id())));
        }
        let info = key_pair.info();
        tables.key_pairs.insert(key_pair.id().clone(), key_pair);
        info!(key_pair_id = %info.id, "Added key pair");
        Ok(info)
    }

    fn remove_key_pair(&self, id: &KeyPairId) -> StoreResult<KeyPairInfo> {
        let mut tables = self.write()?;
        if !tables.key_pairs.contains_key(id) {
            return Err(StoreError::KeyPairNotFound(id.clone()));
        }
        let software = tables.referencing(id);
        if !software.is_empty() {
            return Err(StoreError::KeyPairInUse {
                key_pair_id: id.clone(),
                software,
            });
        }
        let removed = tables
            .key_pairs
            .remove(id)
            .ok_or_else(|| StoreError::KeyPairNotFound(id.clone()))?;
        info!(key_pair_id = %id, "Removed key pair");
        Ok(removed.info())
    }
}
