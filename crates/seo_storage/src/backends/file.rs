use seo_core::{KeyValueStore, Result, StorageError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// One file per key inside a data directory.
///
/// Writes go to a sibling temporary file that is renamed over the target, so
/// a crash mid-write leaves the previous document in place.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    quota_bytes: Option<usize>,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(StorageError::from)?;
        tracing::debug!("Opened file store at {}", dir.display());
        Ok(Self { dir, quota_bytes: None })
    }

    /// Caps total usage the same way [`MemoryStore`](super::memory::MemoryStore)
    /// does: key length plus value length per document. Stored keys are
    /// counted by their file name without the extension.
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.{}", name, EXTENSION))
    }

    fn used_bytes_except(&self, skip: &Path) -> Result<usize> {
        let mut total = 0;
        for entry in fs::read_dir(&self.dir).map_err(StorageError::from)? {
            let entry = entry.map_err(StorageError::from)?;
            let path = entry.path();
            if path == skip || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let key_len = path.file_stem().map_or(0, |stem| stem.len());
            total += key_len + entry.metadata().map_err(StorageError::from)?.len() as usize;
        }
        Ok(total)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => Err(StorageError::Corrupted {
                key: key.to_string(),
                reason: e.to_string(),
            }
            .into()),
            Err(e) => Err(StorageError::Io(e).into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        if let Some(limit) = self.quota_bytes {
            let needed = self.used_bytes_except(&path)? + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                }
                .into());
            }
        }

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value).map_err(StorageError::from)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(StorageError::Io(e).into());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e).into()),
        }
    }
}
