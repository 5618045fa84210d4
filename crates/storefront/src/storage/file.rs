//! Directory-backed storage backend.
//!
//! Each key is stored as `<dir>/<key>.json`. Writes land in a sibling temp
//! file first and are renamed into place, so a crash mid-write leaves the
//! previous value intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Storage, StorageError};

/// Persistent store keeping one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory of the store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error(key, e))?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value).map_err(|e| io_error(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_error(key, e))?;

        debug!(key, path = %path.display(), bytes = value.len(), "Stored value");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.get("cart").unwrap().is_none());
    }

    #[test]
    fn test_value_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut storage = FileStorage::new(dir.path());
            storage.set("cart", r#"[{"id":"a"}]"#).unwrap();
        }

        let reopened = FileStorage::new(dir.path());
        assert_eq!(
            reopened.get("cart").unwrap().as_deref(),
            Some(r#"[{"id":"a"}]"#)
        );
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("store");
        let mut storage = FileStorage::new(&nested);
        storage.set("products", "[]").unwrap();
        assert!(nested.join("products.json").exists());
        assert!(!nested.join(".products.json.tmp").exists());
    }
}
