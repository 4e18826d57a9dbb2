//! Process-local table
//!
//! Used when the shared directory is unreachable and as the in-memory fake in
//! tests. Writes are never visible to the other process.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{ReconcilerError, ReconcilerResult};
use crate::traits::{KeyValueTable, TableKey};

#[derive(Debug, Default)]
pub struct MemoryTable {
    entries: RwLock<HashMap<TableKey, Vec<u8>>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(operation: &str, key: TableKey) -> ReconcilerError {
    ReconcilerError::StorageError {
        operation: operation.to_string(),
        key: key.to_string(),
        reason: "lock poisoned".to_string(),
    }
}

impl KeyValueTable for MemoryTable {
    fn get(&self, key: TableKey) -> ReconcilerResult<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|_| poisoned("get", key))?;
        Ok(entries.get(&key).cloned())
    }

    fn put(&self, key: TableKey, value: &[u8]) -> ReconcilerResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned("put", key))?;
        entries.insert(key, value.to_vec());
        Ok(())
    }

    fn remove(&self, key: TableKey) -> ReconcilerResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned("remove", key))?;
        entries.remove(&key);
        Ok(())
    }

    fn is_shared(&self) -> bool {
        false
    }
}
