use serde::de::DeserializeOwned;
use serde::Serialize;
use seo_core::{Error, KeyValueStore, Result, StorageError};
use std::fmt;
use std::sync::Arc;

/// Whole-document JSON persistence on top of a [`KeyValueStore`].
///
/// Every write replaces the full document under its key; there are no
/// partial updates.
#[derive(Clone)]
pub struct DocumentStore {
    backend: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStore")
            .field("backend", &"<dyn KeyValueStore>")
            .finish()
    }
}

impl DocumentStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Reads and parses the document under `key`. A value that is not valid
    /// JSON for `T` is reported as [`StorageError::Corrupted`].
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).map_err(|e| {
            StorageError::Corrupted {
                key: key.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Like [`read`](Self::read), but a corrupted value is removed and
    /// treated as absent so later reads do not fail again.
    pub fn read_or_reset<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read(key) {
            Err(Error::Storage(StorageError::Corrupted { reason, .. })) => {
                tracing::warn!("⚠️ Discarding corrupted document under {}: {}", key, reason);
                self.remove(key)?;
                Ok(None)
            }
            other => other,
        }
    }

    pub fn write<T: Serialize + ?Sized>(&self, key: &str, document: &T) -> Result<()> {
        let raw = serde_json::to_string(document)?;
        self.backend.set(key, &raw)?;
        tracing::debug!("Wrote {} bytes under {}", raw.len(), key);
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.backend.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_write_then_read() {
        let store = DocumentStore::new(Arc::new(MemoryStore::new()));
        store.write("draft", "hello").unwrap();
        store.write("list", &vec![1, 2, 3]).unwrap();

        assert_eq!(store.read::<String>("draft").unwrap().as_deref(), Some("hello"));
        assert_eq!(store.read::<Vec<i32>>("list").unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(store.read::<String>("missing").unwrap(), None);
    }

    #[test]
    fn test_corrupted_value_is_reported() {
        let backend = Arc::new(MemoryStore::new());
        backend.set("list", "{not json").unwrap();
        let store = DocumentStore::new(backend.clone());

        let err = store.read::<Vec<i32>>("list").unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Corrupted { ref key, .. }) if key == "list"));
        // Plain read leaves the value alone.
        assert!(backend.get("list").unwrap().is_some());
    }

    #[test]
    fn test_read_or_reset_clears_corrupted_key() {
        let backend = Arc::new(MemoryStore::new());
        backend.set("list", "\"a string, not a list\"").unwrap();
        let store = DocumentStore::new(backend.clone());

        assert_eq!(store.read_or_reset::<Vec<i32>>("list").unwrap(), None);
        assert_eq!(backend.get("list").unwrap(), None);
    }

    #[test]
    fn test_quota_failure_propagates() {
        let store = DocumentStore::new(Arc::new(MemoryStore::with_quota(4)));
        let err = store.write("draft", "far too long").unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::QuotaExceeded { .. })));
    }
}
