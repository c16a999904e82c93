//! Error types for the storage layer.

use greenlicense_keys::KeyError;
use greenlicense_types::{KeyPairId, SoftwareId};
use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No software entry with this id.
    #[error("software {0} does not exist")]
    SoftwareNotFound(SoftwareId),

    /// No key pair with this id.
    #[error("key pair {0} does not exist")]
    KeyPairNotFound(KeyPairId),

    /// A record with this id is already stored.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The key pair is still referenced and cannot be removed.
    #[error("key pair {key_pair_id} is still used by {} software entries", .software.len())]
    KeyPairInUse {
        key_pair_id: KeyPairId,
        software: Vec<SoftwareId>,
    },

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored record failed validation on read.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// Key material could not be rebuilt or generated.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Identifier or field validation failed.
    #[error(transparent)]
    Types(#[from] greenlicense_types::Error),

    /// A thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    LockPoisoned,
}
