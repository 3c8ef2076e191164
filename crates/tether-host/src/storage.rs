//! Storage service
//!
//! Local-storage style persistence: both key and value are coerced to host
//! strings. Backend faults never escape as errors; they come back to the
//! guest as the `err` side of the result, with a readable message.

use anyhow::{Context, anyhow};
use tether_core::{BridgeResult, Handle, HandleTable, HostValue};
use tether_kv::{Location, StorageBackend, flate};
use tracing::{debug, warn};

use crate::bridge::Bridge;

/// `localStorage.setItem(String(key), String(val))`
pub fn storage_save(
    table: &HandleTable,
    backend: &dyn StorageBackend,
    key: Handle,
    val: Handle,
) -> BridgeResult<Result<(), String>> {
    let key = table.get(key)?.to_js_string();
    let val = table.get(val)?.to_js_string();

    debug!(target: "tether::storage", backend = backend.name(), key = %key, len = val.len(), "save");
    Ok(backend.set_item(&key, &val).map_err(|e| {
        warn!(target: "tether::storage", key = %key, error = %e, "save failed");
        format!("Couldn't save to localstorage: {}", e)
    }))
}

/// `localStorage.getItem(String(key))`, registering the stored string
pub fn storage_load(
    table: &mut HandleTable,
    backend: &dyn StorageBackend,
    key: Handle,
) -> BridgeResult<Result<Handle, String>> {
    let key = table.get(key)?.to_js_string();

    debug!(target: "tether::storage", backend = backend.name(), key = %key, "load");
    Ok(match backend.get_item(&key) {
        Ok(Some(value)) => Ok(table.register(HostValue::from(value))),
        Ok(None) => Err(format!("Couldn't find key `{}` in localstorage", key)),
        Err(e) => {
            warn!(target: "tether::storage", key = %key, error = %e, "load failed");
            Err(format!("Couldn't load from localstorage: {}", e))
        }
    })
}

/// Pack `data` and save it under `location`'s key through the bridge.
///
/// If this returns `Err` it's *not* guaranteed that nothing was written.
pub fn save_data<T: AsRef<[u8]>>(
    bridge: &mut Bridge,
    location: &Location,
    data: T,
) -> anyhow::Result<()> {
    let packed = flate::zip64(data).context("When packing data for localstorage")?;
    let key = bridge.string(&location.key());
    let val = bridge.string(&packed);

    let result = bridge.storage_save(key, val);
    bridge.release(key)?;
    bridge.release(val)?;

    result?
        .map_err(|oh_no| anyhow!(oh_no))
        .context("When trying to save to localstorage")
}

/// Load and unpack the data saved under `location`'s key.
pub fn load_data(bridge: &mut Bridge, location: &Location) -> anyhow::Result<Vec<u8>> {
    let key = bridge.string(&location.key());
    let result = bridge.storage_load(key);
    bridge.release(key)?;

    let handle = result?
        .map_err(|oh_no| anyhow!(oh_no))
        .context("When trying to load from localstorage")?;
    let packed = bridge.read_string(handle)?;
    bridge.release(handle)?;

    let packed = packed.ok_or_else(|| anyhow!("localstorage returned a non-string value"))?;
    flate::unzip64(packed).context("When unpacking data from localstorage")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_kv::{KvError, KvResult, MemoryStorage};

    struct BrokenStorage;

    impl StorageBackend for BrokenStorage {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn set_item(&self, _: &str, _: &str) -> KvResult<()> {
            Err(KvError::Database("disk on fire".into()))
        }
        fn get_item(&self, _: &str) -> KvResult<Option<String>> {
            Err(KvError::Database("disk on fire".into()))
        }
        fn remove_item(&self, _: &str) -> KvResult<bool> {
            Ok(false)
        }
        fn keys(&self) -> KvResult<Vec<String>> {
            Ok(Vec::new())
        }
        fn clear(&self) -> KvResult<()> {
            Ok(())
        }
        fn len(&self) -> KvResult<usize> {
            Ok(0)
        }
    }

    #[test]
    fn test_save_then_load() {
        let mut table = HandleTable::new();
        let backend = MemoryStorage::new();
        let key = table.register(HostValue::string("token"));
        let val = table.register(HostValue::string("abc123"));

        assert_eq!(storage_save(&table, &backend, key, val).unwrap(), Ok(()));
        let loaded = storage_load(&mut table, &backend, key).unwrap().unwrap();
        assert_eq!(table.resolve(loaded).unwrap().as_str(), Some("abc123"));
    }

    #[test]
    fn test_keys_and_values_are_coerced() {
        let mut table = HandleTable::new();
        let backend = MemoryStorage::new();
        let key = table.register(HostValue::Null);
        let val = table.register(HostValue::Number(1.5));

        storage_save(&table, &backend, key, val).unwrap().unwrap();
        assert_eq!(backend.get_item("null").unwrap().as_deref(), Some("1.5"));
    }

    #[test]
    fn test_missing_key() {
        let mut table = HandleTable::new();
        let key = table.register(HostValue::string("missing-key"));

        let result = storage_load(&mut table, &MemoryStorage::new(), key).unwrap();
        assert_eq!(
            result,
            Err("Couldn't find key `missing-key` in localstorage".to_string())
        );
    }

    #[test]
    fn test_backend_faults_become_messages() {
        let mut table = HandleTable::new();
        let key = table.register(HostValue::string("k"));

        let saved = storage_save(&table, &BrokenStorage, key, key).unwrap();
        assert_eq!(
            saved,
            Err("Couldn't save to localstorage: Database error: disk on fire".to_string())
        );
        let loaded = storage_load(&mut table, &BrokenStorage, key).unwrap();
        assert_eq!(
            loaded,
            Err("Couldn't load from localstorage: Database error: disk on fire".to_string())
        );
    }

    #[test]
    fn test_quota_fault() {
        let mut table = HandleTable::new();
        let key = table.register(HostValue::string("key"));
        let val = table.register(HostValue::string("a long value"));

        let saved = storage_save(&table, &MemoryStorage::with_quota(4), key, val).unwrap();
        assert!(saved.unwrap_err().starts_with("Couldn't save to localstorage: Quota exceeded"));
    }
}
