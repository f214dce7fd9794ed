use seo_core::{Error, KeyValueStore, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

pub mod backends;
pub mod document;

pub use backends::*;
pub use document::DocumentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    Memory,
    #[default]
    File,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            other => Err(Error::Config(format!(
                "Unknown storage backend: {} (expected memory or file)",
                other
            ))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::File => f.write_str("file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub kind: StorageKind,
    pub data_dir: PathBuf,
    pub quota_bytes: Option<usize>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: StorageKind::default(),
            data_dir: PathBuf::from(".seo-data"),
            quota_bytes: None,
        }
    }
}

impl StorageConfig {
    /// Reads `SEO_STORAGE`, `SEO_DATA_DIR` and `SEO_QUOTA_BYTES`, falling back
    /// to the defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(kind) = env::var("SEO_STORAGE") {
            config.kind = kind.parse()?;
        }
        if let Ok(dir) = env::var("SEO_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(quota) = env::var("SEO_QUOTA_BYTES") {
            let quota = quota
                .parse::<usize>()
                .map_err(|e| Error::Config(format!("Invalid SEO_QUOTA_BYTES: {}", e)))?;
            config.quota_bytes = Some(quota);
        }
        Ok(config)
    }
}

pub fn create_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match (config.kind, config.quota_bytes) {
        (StorageKind::Memory, None) => Arc::new(MemoryStore::new()),
        (StorageKind::Memory, Some(quota)) => Arc::new(MemoryStore::with_quota(quota)),
        (StorageKind::File, quota) => {
            let store = FileStore::open(config.data_dir.clone())?;
            Arc::new(match quota {
                Some(quota) => store.with_quota(quota),
                None => store,
            })
        }
    };
    tracing::info!("💾 Storage backend ready (using {})", config.kind);
    Ok(store)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_store, DocumentStore, StorageConfig, StorageKind};
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_storage_kind_parsing() {
        assert_eq!("memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert_eq!(" FILE ".parse::<StorageKind>().unwrap(), StorageKind::File);
        assert!(matches!("qdrant".parse::<StorageKind>(), Err(Error::Config(_))));
    }

    #[test]
    fn test_create_file_store() {
        let temp_dir = tempdir().unwrap();
        let config = StorageConfig {
            kind: StorageKind::File,
            data_dir: temp_dir.path().join("nested"),
            quota_bytes: Some(1024),
        };

        let store = create_store(&config).unwrap();
        store.set("k", "v").unwrap();
        assert!(temp_dir.path().join("nested").join("k.json").exists());
    }
}
