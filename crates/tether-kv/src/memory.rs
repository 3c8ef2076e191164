//! In-memory storage with an optional byte quota, like a browser's local
//! storage.

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::backend::StorageBackend;
use crate::error::{KvError, KvResult};

/// Insertion-ordered in-memory store
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<IndexMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes once keys plus values exceed `quota` bytes
    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: RwLock::new(IndexMap::new()),
            quota: Some(quota),
        }
    }

    pub fn quota(&self) -> Option<usize> {
        self.quota
    }

    /// Bytes currently used by keys and values
    pub fn used_bytes(&self) -> usize {
        self.items
            .read()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn set_item(&self, key: &str, value: &str) -> KvResult<()> {
        let mut items = self.items.write();
        if let Some(quota) = self.quota {
            let used: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = used + key.len() + value.len();
            if needed > quota {
                return Err(KvError::QuotaExceeded { needed, quota });
            }
        }
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_item(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.items.read().get(key).cloned())
    }

    fn remove_item(&self, key: &str) -> KvResult<bool> {
        Ok(self.items.write().shift_remove(key).is_some())
    }

    fn keys(&self) -> KvResult<Vec<String>> {
        Ok(self.items.read().keys().cloned().collect())
    }

    fn clear(&self) -> KvResult<()> {
        self.items.write().clear();
        Ok(())
    }

    fn len(&self) -> KvResult<usize> {
        Ok(self.items.read().len())
    }
}
