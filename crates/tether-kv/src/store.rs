//! KV store implementation using redb

use redb::backends::InMemoryBackend;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use tracing::debug;

use crate::backend::StorageBackend;
use crate::error::{KvError, KvResult};

// Table definition for the KV store
const TABLE: TableDefinition<&str, &str> = TableDefinition::new("localstorage");

fn db_err(e: impl std::fmt::Display) -> KvError {
    KvError::Database(e.to_string())
}

/// KV store backed by redb
pub struct KvStore {
    db: Database,
    is_memory: bool,
}

impl KvStore {
    /// Open or create a KV store
    ///
    /// # Arguments
    /// * `path` - Database path. Use `:memory:` for an in-memory database,
    ///   or a file path for persistent storage
    pub fn open(path: &str) -> KvResult<Self> {
        let is_memory = path == ":memory:";

        let db = if is_memory {
            Database::builder()
                .create_with_backend(InMemoryBackend::new())
                .map_err(db_err)?
        } else {
            let path = Path::new(path);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| KvError::InvalidPath(e.to_string()))?;
                }
            }
            Database::create(path).map_err(db_err)?
        };

        // Initialize the table
        {
            let write_txn = db.begin_write().map_err(db_err)?;
            {
                let _ = write_txn.open_table(TABLE).map_err(db_err)?;
            }
            write_txn.commit().map_err(db_err)?;
        }

        debug!(target: "tether::kv", path, "opened kv store");
        Ok(Self { db, is_memory })
    }

    /// Check if this is an in-memory store
    pub fn is_memory(&self) -> bool {
        self.is_memory
    }
}

impl StorageBackend for KvStore {
    fn name(&self) -> &'static str {
        "redb"
    }

    fn set_item(&self, key: &str, value: &str) -> KvResult<()> {
        let write_txn = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(db_err)?;
            table.insert(key, value).map_err(db_err)?;
        }
        write_txn.commit().map_err(db_err)
    }

    fn get_item(&self, key: &str) -> KvResult<Option<String>> {
        let read_txn = self.db.begin_read().map_err(db_err)?;
        let table = read_txn.open_table(TABLE).map_err(db_err)?;

        match table.get(key) {
            Ok(Some(guard)) => Ok(Some(guard.value().to_string())),
            Ok(None) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    fn remove_item(&self, key: &str) -> KvResult<bool> {
        let write_txn = self.db.begin_write().map_err(db_err)?;
        let existed = {
            let mut table = write_txn.open_table(TABLE).map_err(db_err)?;
            let removed = table.remove(key).map_err(db_err)?;
            removed.is_some()
        };
        write_txn.commit().map_err(db_err)?;
        Ok(existed)
    }

    fn keys(&self) -> KvResult<Vec<String>> {
        let read_txn = self.db.begin_read().map_err(db_err)?;
        let table = read_txn.open_table(TABLE).map_err(db_err)?;

        let mut keys = Vec::new();
        for item in table.iter().map_err(db_err)? {
            let (key, _) = item.map_err(db_err)?;
            keys.push(key.value().to_string());
        }
        Ok(keys)
    }

    fn clear(&self) -> KvResult<()> {
        let keys = self.keys()?;
        let write_txn = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(db_err)?;
            for key in keys {
                table.remove(key.as_str()).map_err(db_err)?;
            }
        }
        write_txn.commit().map_err(db_err)
    }

    fn len(&self) -> KvResult<usize> {
        let read_txn = self.db.begin_read().map_err(db_err)?;
        let table = read_txn.open_table(TABLE).map_err(db_err)?;

        // Count items by iterating
        let iter = table.iter().map_err(db_err)?;
        Ok(iter.count())
    }
}
