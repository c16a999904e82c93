//! SQLite-backed store.
//!
//! Key pairs and software live in two tables of one database file. Every
//! check-then-write runs inside a transaction.

use crate::LicenseStore;
use crate::error::{StoreError, StoreResult};
use greenlicense_keys::{KeyAlgorithm, KeyPair, KeyPairInfo, PublicKey, SecretKey};
use greenlicense_types::{KeyPairId, LicenseVersion, Software, SoftwareId};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};
use zeroize::Zeroizing;

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS key_pairs (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        algorithm TEXT NOT NULL,
        size INTEGER NOT NULL,
        public_key TEXT NOT NULL,
        secret_key BLOB NOT NULL
    );

    CREATE TABLE IF NOT EXISTS software (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        version TEXT NOT NULL,
        key_pair_id TEXT NOT NULL REFERENCES key_pairs(id),
        license_version INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_software_key_pair ON software(key_pair_id);
";

/// Persistent store backed by a single SQLite file.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "Opened SQLite store");
        Self::with_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

struct SoftwareRow {
    id: String,
    name: String,
    version: String,
    key_pair_id: String,
    license_version: u8,
}

impl SoftwareRow {
    const COLUMNS: &'static str = "id, name, version, key_pair_id, license_version";

    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            version: row.get(2)?,
            key_pair_id: row.get(3)?,
            license_version: row.get(4)?,
        })
    }

    fn into_software(self) -> StoreResult<Software> {
        let id = SoftwareId::new(&self.id)?;
        if id.as_str() != self.id {
            return Err(StoreError::Corrupt(format!(
                "software id '{}' is not normalized",
                self.id
            )));
        }
        Ok(Software::with_id(
            id,
            &self.name,
            &self.version,
            KeyPairId::new(&self.key_pair_id)?,
            LicenseVersion::try_from(self.license_version)?,
        )?)
    }
}

struct KeyPairRow {
    id: String,
    name: String,
    algorithm: String,
    size: u32,
    public_key: String,
    secret_key: Zeroizing<Vec<u8>>,
}

impl KeyPairRow {
    const COLUMNS: &'static str = "id, name, algorithm, size, public_key, secret_key";

    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            algorithm: row.get(2)?,
            size: row.get(3)?,
            public_key: row.get(4)?,
            secret_key: Zeroizing::new(row.get(5)?),
        })
    }

    fn into_key_pair(self) -> StoreResult<KeyPair> {
        let algorithm: KeyAlgorithm = self.algorithm.parse()?;
        let secret = SecretKey::from_slice(&self.secret_key)?;
        let key_pair = KeyPair::from_parts(
            KeyPairId::new(&self.id)?,
            &self.name,
            algorithm,
            self.size,
            secret,
        )?;
        if key_pair.export_public() != self.public_key {
            return Err(StoreError::Corrupt(format!(
                "key pair {} public key does not match its private key",
                self.id
            )));
        }
        Ok(key_pair)
    }
}

/// Public columns of a key pair; the secret column is never read.
struct KeyPairInfoRow {
    id: String,
    name: String,
    algorithm: String,
    size: u32,
    public_key: String,
}

impl KeyPairInfoRow {
    const COLUMNS: &'static str = "id, name, algorithm, size, public_key";

    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            algorithm: row.get(2)?,
            size: row.get(3)?,
            public_key: row.get(4)?,
        })
    }

    fn into_info(self) -> StoreResult<KeyPairInfo> {
        let public_key = PublicKey::from_exported(&self.public_key).map_err(|e| {
            StoreError::Corrupt(format!("key pair {} public key: {e}", self.id))
        })?;
        Ok(KeyPairInfo::new(
            KeyPairId::new(&self.id)?,
            self.name,
            self.algorithm.parse()?,
            self.size,
            &public_key,
        ))
    }
}

fn software_exists(tx: &Transaction<'_>, id: &SoftwareId) -> StoreResult<bool> {
    Ok(tx
        .query_row(
            "SELECT 1 FROM software WHERE id = ?1",
            params![id.as_str()],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

fn load_key_pair(conn: &Connection, id: &KeyPairId) -> StoreResult<Option<KeyPair>> {
    let sql = format!("SELECT {} FROM key_pairs WHERE id = ?1", KeyPairRow::COLUMNS);
    conn.query_row(&sql, params![id.as_str()], KeyPairRow::read)
        .optional()?
        .map(KeyPairRow::into_key_pair)
        .transpose()
}

fn load_key_pair_info(conn: &Connection, id: &KeyPairId) -> StoreResult<Option<KeyPairInfo>> {
    let sql = format!("SELECT {} FROM key_pairs WHERE id = ?1", KeyPairInfoRow::COLUMNS);
    conn.query_row(&sql, params![id.as_str()], KeyPairInfoRow::read)
        .optional()?
        .map(KeyPairInfoRow::into_info)
        .transpose()
}

impl LicenseStore for SqliteStore {
    fn get_software(&self, id: &SoftwareId) -> StoreResult<Option<Software>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM software WHERE id = ?1", SoftwareRow::COLUMNS);
        conn.query_row(&sql, params![id.as_str()], SoftwareRow::read)
            .optional()?
            .map(SoftwareRow::into_software)
            .transpose()
    }

    fn all_software(&self) -> StoreResult<Vec<Software>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM software ORDER BY id", SoftwareRow::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], SoftwareRow::read)?;
        rows.map(|row| row.map_err(StoreError::from).and_then(SoftwareRow::into_software))
            .collect()
    }

    fn add_software(&self, software: Software) -> StoreResult<Software> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        if load_key_pair_info(&tx, software.key_pair_id())?.is_none() {
            return Err(StoreError::KeyPairNotFound(software.key_pair_id().clone()));
        }
        if software_exists(&tx, software.id())? {
            return Err(StoreError::AlreadyExists(format!("software {}", software.id())));
        }
        tx.execute(
            "INSERT INTO software (id, name, version, key_pair_id, license_version)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                software.id().as_str(),
                software.name(),
                software.version(),
                software.key_pair_id().as_str(),
                software.license_version().as_u8(),
            ],
        )?;
        tx.commit()?;
        info!(
            software_id = %software.id(),
            key_pair_id = %software.key_pair_id(),
            "Added software"
        );
        Ok(software)
    }

    fn remove_software(&self, id: &SoftwareId) -> StoreResult<Software> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let sql = format!("SELECT {} FROM software WHERE id = ?1", SoftwareRow::COLUMNS);
        let software = tx
            .query_row(&sql, params![id.as_str()], SoftwareRow::read)
            .optional()?
            .ok_or_else(|| StoreError::SoftwareNotFound(id.clone()))?
            .into_software()?;
        tx.execute("DELETE FROM software WHERE id = ?1", params![id.as_str()])?;
        tx.commit()?;
        info!(software_id = %id, "Removed software");
        Ok(software)
    }

    fn get_key_pair(&self, id: &KeyPairId) -> StoreResult<Option<KeyPair>> {
        let conn = self.lock()?;
        load_key_pair(&conn, id)
    }

    fn get_key_pair_info(&self, id: &KeyPairId) -> StoreResult<Option<KeyPairInfo>> {
        let conn = self.lock()?;
        load_key_pair_info(&conn, id)
    }

    fn all_key_pairs(&self) -> StoreResult<Vec<KeyPairInfo>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM key_pairs ORDER BY id", KeyPairInfoRow::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], KeyPairInfoRow::read)?;
        rows.map(|row| row.map_err(StoreError::from).and_then(KeyPairInfoRow::into_info))
            .collect()
    }

    fn add_key_pair(&self, key_pair: KeyPair) -> StoreResult<KeyPairInfo> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let exists = tx
            .query_row(
                "SELECT 1 FROM key_pairs WHERE id = ?1",
                params![key_pair.id().as_str()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            return Err(StoreError::AlreadyExists(format!("key pair {}", key_pair.id())));
        }
        tx.execute(
            "INSERT INTO key_pairs (id, name, algorithm, size, public_key, secret_key)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                key_pair.id().as_str(),
                key_pair.name(),
                key_pair.algorithm().as_str(),
                key_pair.size(),
                key_pair.export_public(),
                &key_pair.secret_key().expose_bytes()[..],
            ],
        )?;
        tx.commit()?;
        let info = key_pair.info();
        info!(key_pair_id = %info.id, "Added key pair");
        Ok(info)
    }

    fn remove_key_pair(&self, id: &KeyPairId) -> StoreResult<KeyPairInfo> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let info = load_key_pair_info(&tx, id)?
            .ok_or_else(|| StoreError::KeyPairNotFound(id.clone()))?;

        let software = {
            let mut stmt =
                tx.prepare("SELECT id FROM software WHERE key_pair_id = ?1 ORDER BY id")?;
            let ids = stmt.query_map(params![id.as_str()], |row| row.get::<_, String>(0))?;
            ids.map(|raw| -> StoreResult<SoftwareId> { Ok(SoftwareId::new(&raw?)?) })
                .collect::<StoreResult<Vec<_>>>()?
        };
        if !software.is_empty() {
            return Err(StoreError::KeyPairInUse {
                key_pair_id: id.clone(),
                software,
            });
        }

        tx.execute("DELETE FROM key_pairs WHERE id = ?1", params![id.as_str()])?;
        tx.commit()?;
        info!(key_pair_id = %id, "Removed key pair");
        Ok(info)
    }
}
