//! Storage for software entries and signing key pairs.
//!
//! The license engine only needs read-by-id and insert; this crate defines
//! that contract as [`LicenseStore`] and ships two backends:
//!
//! - [`MemoryStore`]: process-local, for tests and embedding
//! - [`SqliteStore`]: a single SQLite file, used by the command-line tool
//!
//! # Referential integrity
//!
//! Every software entry references exactly one key pair. Both backends refuse
//! to add software whose key pair is unknown and refuse to remove a key pair
//! that software still references ([`StoreError::KeyPairInUse`]). Removing
//! software never removes its key pair.

mod error;
mod memory;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use greenlicense_keys::{KeyPair, KeyPairInfo, KeyParams, PublicKey};
use greenlicense_types::{KeyPairId, Software, SoftwareId};
use std::sync::Arc;

/// Persistence contract for software entries and key pairs.
///
/// Reads by id return either a complete record or `None`, never a partially
/// written one.
pub trait LicenseStore: Send + Sync {
    /// Looks up a software entry.
    fn get_software(&self, id: &SoftwareId) -> StoreResult<Option<Software>>;

    /// Lists all software entries ordered by id.
    fn all_software(&self) -> StoreResult<Vec<Software>>;

    /// Stores a new software entry.
    ///
    /// Fails with [`StoreError::KeyPairNotFound`] if its key pair is unknown
    /// and [`StoreError::AlreadyExists`] if the id is taken.
    fn add_software(&self, software: Software) -> StoreResult<Software>;

    /// Removes a software entry and returns it.
    fn remove_software(&self, id: &SoftwareId) -> StoreResult<Software>;

    /// Looks up a key pair, including its private key.
    ///
    /// Only issuance needs this; verification goes through
    /// [`LicenseStore::get_public_key`].
    fn get_key_pair(&self, id: &KeyPairId) -> StoreResult<Option<KeyPair>>;

    /// Looks up the listing view of a key pair without touching its secret.
    fn get_key_pair_info(&self, id: &KeyPairId) -> StoreResult<Option<KeyPairInfo>>;

    /// Lists all key pairs ordered by id, without secret material.
    fn all_key_pairs(&self) -> StoreResult<Vec<KeyPairInfo>>;

    /// Stores a new key pair.
    fn add_key_pair(&self, key_pair: KeyPair) -> StoreResult<KeyPairInfo>;

    /// Removes an unreferenced key pair and returns its listing view.
    fn remove_key_pair(&self, id: &KeyPairId) -> StoreResult<KeyPairInfo>;

    /// Generates a fresh key pair and stores it.
    fn generate_key_pair(&self, params: &KeyParams) -> StoreResult<KeyPairInfo> {
        let key_pair = KeyPair::generate(params)?;
        self.add_key_pair(key_pair)
    }

    /// Looks up the public half of a key pair.
    fn get_public_key(&self, id: &KeyPairId) -> StoreResult<Option<PublicKey>> {
        self.get_key_pair_info(id)?
            .map(|info| info.parse_public_key().map_err(StoreError::from))
            .transpose()
    }
}

impl<S: LicenseStore + ?Sized> LicenseStore for Arc<S> {
    fn get_software(&self, id: &SoftwareId) -> StoreResult<Option<Software>> {
        (**self).get_software(id)
    }

    fn all_software(&self) -> StoreResult<Vec<Software>> {
        (**self).all_software()
    }

    fn add_software(&self, software: Software) -> StoreResult<Software> {
        (**self).add_software(software)
    }

    fn remove_software(&self, id: &SoftwareId) -> StoreResult<Software> {
        (**self).remove_software(id)
    }

    fn get_key_pair(&self, id: &KeyPairId) -> StoreResult<Option<KeyPair>> {
        (**self).get_key_pair(id)
    }

    fn get_key_pair_info(&self, id: &KeyPairId) -> StoreResult<Option<KeyPairInfo>> {
        (**self).get_key_pair_info(id)
    }

    fn all_key_pairs(&self) -> StoreResult<Vec<KeyPairInfo>> {
        (**self).all_key_pairs()
    }

    fn add_key_pair(&self, key_pair: KeyPair) -> StoreResult<KeyPairInfo> {
        (**self).add_key_pair(key_pair)
    }

    fn remove_key_pair(&self, id: &KeyPairId) -> StoreResult<KeyPairInfo> {
        (**self).remove_key_pair(id)
    }

    fn generate_key_pair(&self, params: &KeyParams) -> StoreResult<KeyPairInfo> {
        (**self).generate_key_pair(params)
    }

    fn get_public_key(&self, id: &KeyPairId) -> StoreResult<Option<PublicKey>> {
        (**self).get_public_key(id)
    }
}
