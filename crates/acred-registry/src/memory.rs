use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use acred_core::{RegistryError, RegistryResult, Storage, Table, WriteBatch, WriteOp};

type Tables = BTreeMap<Table, BTreeMap<Vec<u8>, Vec<u8>>>;

/// In-memory storage backend.
///
/// Every operation takes the same lock, so a [`WriteBatch`] is applied
/// atomically with respect to all readers.
pub struct InMemoryStorage {
    tables: Mutex<Tables>,
}

fn lock_tables(mutex: &Mutex<Tables>) -> RegistryResult<MutexGuard<'_, Tables>> {
    mutex
        .lock()
        .map_err(|e| RegistryError::Storage(format!("lock poisoned: {}", e)))
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of entries in a table.
    pub fn count(&self, table: Table) -> RegistryResult<usize> {
        let tables = lock_tables(&self.tables)?;
        Ok(tables.get(&table).map_or(0, |entries| entries.len()))
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for InMemoryStorage {
    fn get(&self, table: Table, key: &[u8]) -> RegistryResult<Option<Vec<u8>>> {
        let tables = lock_tables(&self.tables)?;
        Ok(tables.get(&table).and_then(|t| t.get(key)).cloned())
    }

    fn put(&self, table: Table, key: &[u8], value: &[u8]) -> RegistryResult<()> {
        let mut tables = lock_tables(&self.tables)?;
        tables
            .entry(table)
            .or_default()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, table: Table, key: &[u8]) -> RegistryResult<()> {
        let mut tables = lock_tables(&self.tables)?;
        if let Some(t) = tables.get_mut(&table) {
            t.remove(key);
        }
        Ok(())
    }

    fn scan(&self, table: Table) -> RegistryResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let tables = lock_tables(&self.tables)?;
        Ok(tables
            .get(&table)
            .map(|t| t.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    fn write(&self, batch: WriteBatch) -> RegistryResult<()> {
        let mut tables = lock_tables(&self.tables)?;
        for op in batch.into_ops() {
            match op {
                WriteOp::Put { table, key, value } => {
                    tables.entry(table).or_default().insert(key, value);
                }
                WriteOp::Delete { table, key } => {
                    if let Some(t) = tables.get_mut(&table) {
                        t.remove(&key);
                    }
                }
            }
        }
        Ok(())
    }
}
