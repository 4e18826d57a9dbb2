//! Shared directory table
//!
//! Stores each logical key as `<namespace>.<key>.json` inside a directory both
//! cooperating processes can reach. Writes go to a temporary file in the same
//! directory and are renamed over the target, so a reader in the other process
//! sees either the old payload or the new one, never a torn write. Reads always
//! hit the disk so the other process's writes show up without coordination.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use shared::config::is_valid_namespace;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ReconcilerError, ReconcilerResult};
use crate::traits::{KeyValueTable, TableKey};

#[derive(Debug, Clone)]
pub struct SharedFileTable {
    dir: PathBuf,
    namespace: String,
}

impl SharedFileTable {
    /// Open (creating if needed) the shared directory and check it is writable
    ///
    /// The namespace must be a plain file name prefix (see
    /// [`is_valid_namespace`]).
    pub fn open(dir: impl Into<PathBuf>, namespace: &str) -> ReconcilerResult<Self> {
        let dir = dir.into();
        if !is_valid_namespace(namespace) {
            return Err(ReconcilerError::StorageUnavailable {
                path: dir.display().to_string(),
                reason: format!("invalid namespace '{namespace}'"),
            });
        }
        let unavailable = |e: io::Error| ReconcilerError::StorageUnavailable {
            path: dir.display().to_string(),
            reason: e.to_string(),
        };

        fs::create_dir_all(&dir).map_err(unavailable)?;
        tempfile::Builder::new()
            .prefix(".probe")
            .tempfile_in(&dir)
            .map_err(unavailable)?;

        debug!(dir = %dir.display(), namespace, "📁 Opened shared table");
        Ok(Self {
            dir,
            namespace: namespace.to_string(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing a logical key
    pub fn path_for(&self, key: TableKey) -> PathBuf {
        self.dir.join(format!("{}.{}.json", self.namespace, key.as_str()))
    }

    fn storage_error(operation: &str, key: TableKey, err: io::Error) -> ReconcilerError {
        ReconcilerError::StorageError {
            operation: operation.to_string(),
            key: key.to_string(),
            reason: err.to_string(),
        }
    }
}

impl KeyValueTable for SharedFileTable {
    fn get(&self, key: TableKey) -> ReconcilerResult<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::storage_error("get", key, e)),
        }
    }

    fn put(&self, key: TableKey, value: &[u8]) -> ReconcilerResult<()> {
        let write = || -> io::Result<()> {
            let mut file = NamedTempFile::new_in(&self.dir)?;
            file.write_all(value)?;
            file.as_file().sync_all()?;
            file.persist(self.path_for(key)).map_err(|e| e.error)?;
            Ok(())
        };
        write().map_err(|e| Self::storage_error("put", key, e))?;

        debug!(key = %key, bytes = value.len(), "💾 Wrote shared table entry");
        Ok(())
    }

    fn remove(&self, key: TableKey) -> ReconcilerResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::storage_error("remove", key, e)),
        }
    }

    fn is_shared(&self) -> bool {
        true
    }
}
