use crate::error::KvResult;

/// A string-to-string store with local-storage semantics.
///
/// Writes to an existing key replace its value. Implementations are shared
/// behind `Arc` by the host adapters, so every method takes `&self`.
pub trait StorageBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn set_item(&self, key: &str, value: &str) -> KvResult<()>;

    /// `None` if the key is absent
    fn get_item(&self, key: &str) -> KvResult<Option<String>>;

    /// Returns whether the key existed
    fn remove_item(&self, key: &str) -> KvResult<bool>;

    fn keys(&self) -> KvResult<Vec<String>>;

    fn clear(&self) -> KvResult<()>;

    fn len(&self) -> KvResult<usize>;

    fn is_empty(&self) -> KvResult<bool> {
        Ok(self.len()? == 0)
    }
}
