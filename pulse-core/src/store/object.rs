//! Object store trait and the filesystem-backed implementation.
//!
//! Keys are `/`-separated relative paths (`ohlcv/stocks/SPY/daily/2026-08-05.parquet`).
//! Date-encoded basenames sort lexicographically in chronological order, which
//! the context loader relies on to pick the latest payload under a prefix.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Structured error types for store operations.
///
/// `NotFound` and `Malformed` describe the data; `Backend` means the storage
/// layer itself misbehaved (unreachable, permission denied, I/O failure).
/// Callers that fail closed treat the three differently, so the distinction
/// is part of the contract.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Read-only object store surface.
///
/// `list` distinguishes "no objects under this prefix" (`Ok(vec![])`) from
/// "could not list" (`Err(Backend)`). An empty listing is a data condition;
/// a failed listing is an infrastructure condition.
pub trait ObjectStore {
    /// All keys under the prefix, in unspecified order.
    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Raw bytes of a single object.
    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;
}

/// Object store rooted at a local directory.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl ObjectStore for FsObjectStore {
    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.key_path(prefix);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir)
            .map_err(|e| StoreError::Backend(format!("list '{prefix}': {e}")))?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| StoreError::Backend(format!("list '{prefix}': {e}")))?;
            if !entry.path().is_file() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let sep = if prefix.is_empty() || prefix.ends_with('/') {
                ""
            } else {
                "/"
            };
            keys.push(format!("{prefix}{sep}{name}"));
        }
        Ok(keys)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.key_path(key);
        if !path.exists() {
            return Err(StoreError::NotFound {
                key: key.to_string(),
            });
        }
        fs::read(&path).map_err(|e| StoreError::Backend(format!("get '{key}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_objects(objects: &[(&str, &[u8])]) -> (TempDir, FsObjectStore) {
        let dir = TempDir::new().unwrap();
        for (key, bytes) in objects {
            let path = dir.path().join(key);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, bytes).unwrap();
        }
        let store = FsObjectStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn list_returns_keys_with_prefix() {
        let (_dir, store) = store_with_objects(&[
            ("ohlcv/a/2024-01-02.parquet", b"x"),
            ("ohlcv/a/2024-01-03.parquet", b"y"),
        ]);
        let mut keys = store.list("ohlcv/a").unwrap();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "ohlcv/a/2024-01-02.parquet".to_string(),
                "ohlcv/a/2024-01-03.parquet".to_string(),
            ]
        );
    }

    #[test]
    fn list_missing_prefix_is_empty_not_error() {
        let (_dir, store) = store_with_objects(&[]);
        assert!(store.list("no/such/prefix").unwrap().is_empty());
    }

    #[test]
    fn get_reads_bytes() {
        let (_dir, store) = store_with_objects(&[("macro/VIXCLS.parquet", b"payload")]);
        assert_eq!(store.get("macro/VIXCLS.parquet").unwrap(), b"payload");
    }

    #[test]
    fn get_missing_key_is_not_found() {
        let (_dir, store) = store_with_objects(&[]);
        let err = store.get("macro/VIXCLS.parquet").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
