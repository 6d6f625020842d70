//! Durable [`KeyValueMedium`] over an LMDB environment.
//!
//! Each storage key maps to one LMDB entry holding the collection's JSON text.
//! Every `set` runs in its own write transaction, so a single collection write
//! is atomic while writes to different keys are not grouped.

use std::fs;
use std::path::{Path, PathBuf};

use lmdb::{Database, DatabaseFlags, Environment, Transaction, WriteFlags};
use log::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::storage_medium::KeyValueMedium;

pub const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024;

pub struct LmdbMedium {
    env: Environment,
    db: Database,
    path: PathBuf,
    map_size: usize,
}

impl LmdbMedium {
    /// Opens (or creates) the environment at `<name>.lmdb` with the default map size.
    pub fn open(name: &str) -> StoreResult<Self> {
        Self::open_with_map_size(name, DEFAULT_MAP_SIZE)
    }

    pub fn open_with_map_size(name: &str, map_size: usize) -> StoreResult<Self> {
        let path = PathBuf::from(format!("{name}.lmdb"));
        fs::create_dir_all(&path).map_err(|e| StoreError::StorageWriteFailure {
            key: path.display().to_string(),
            reason: format!("cannot create environment directory: {e}"),
        })?;

        let env = Environment::new()
            .set_max_dbs(1)
            .set_map_size(map_size)
            .open(&path)?;
        let db = env.create_db(None, DatabaseFlags::empty())?;

        info!("Opened LMDB medium at {}", path.display());
        Ok(Self { env, db, path, map_size })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes buffers to disk. The environment itself is released on drop.
    pub fn close(&self) -> StoreResult<()> {
        self.env.sync(true)?;
        info!("Closed LMDB medium at {}", self.path.display());
        Ok(())
    }

    /// Removes every stored key, leaving the environment usable.
    pub fn clear(&self) -> StoreResult<()> {
        let mut txn = self.env.begin_rw_txn()?;
        txn.clear_db(self.db)?;
        txn.commit()?;
        warn!("Cleared every key in {}", self.path.display());
        Ok(())
    }
}

impl KeyValueMedium for LmdbMedium {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let txn = self.env.begin_ro_txn()?;
        let raw = match txn.get(self.db, &key) {
            Ok(bytes) => bytes,
            Err(lmdb::Error::NotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let text = std::str::from_utf8(raw).map_err(|e| StoreError::StorageReadFailure {
            key: key.to_string(),
            reason: format!("value is not UTF-8: {e}"),
        })?;
        Ok(Some(text.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut txn = self.env.begin_rw_txn()?;
        txn.put(self.db, &key, &value, WriteFlags::empty())
            .map_err(|e| match e {
                lmdb::Error::MapFull => StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed: key.len() + value.len(),
                    quota: self.map_size,
                },
                other => StoreError::Database(other),
            })?;
        txn.commit()?;
        debug!("lmdb set '{}' ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut txn = self.env.begin_rw_txn()?;
        match txn.del(self.db, &key, None) {
            Ok(()) | Err(lmdb::Error::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
        txn.commit()?;
        Ok(())
    }
}
