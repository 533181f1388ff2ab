//! RocksDB storage backend for the Acred node.

use anyhow::Result;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, DB};
use std::path::Path;

use acred_core::{RegistryError, RegistryResult, Storage, Table, WriteBatch, WriteOp};

/// RocksDB-backed storage with one column family per ledger table.
pub struct RocksStorage {
    db: DB,
}

fn storage_err(e: rocksdb::Error) -> RegistryError {
    RegistryError::Storage(e.to_string())
}

impl RocksStorage {
    /// Open or create a RocksDB database at the given path with column families.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = Table::ALL
            .iter()
            .map(|t| ColumnFamilyDescriptor::new(t.name(), Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;
        tracing::debug!(path = %path.display(), "rocksdb opened");

        Ok(Self { db })
    }

    fn cf(&self, table: Table) -> RegistryResult<&ColumnFamily> {
        self.db.cf_handle(table.name()).ok_or_else(|| {
            RegistryError::Storage(format!("column family '{}' not found", table.name()))
        })
    }
}

impl Storage for RocksStorage {
    fn get(&self, table: Table, key: &[u8]) -> RegistryResult<Option<Vec<u8>>> {
        let cf = self.cf(table)?;
        self.db.get_cf(cf, key).map_err(storage_err)
    }

    fn put(&self, table: Table, key: &[u8], value: &[u8]) -> RegistryResult<()> {
        let cf = self.cf(table)?;
        self.db.put_cf(cf, key, value).map_err(storage_err)
    }

    fn delete(&self, table: Table, key: &[u8]) -> RegistryResult<()> {
        let cf = self.cf(table)?;
        self.db.delete_cf(cf, key).map_err(storage_err)
    }

    fn scan(&self, table: Table) -> RegistryResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let cf = self.cf(table)?;
        let mut entries = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item.map_err(storage_err)?;
            entries.push((key.to_vec(), value.to_vec()));
        }
        Ok(entries)
    }

    fn write(&self, batch: WriteBatch) -> RegistryResult<()> {
        let mut rocks_batch = rocksdb::WriteBatch::default();
        for op in batch.into_ops() {
            match op {
                WriteOp::Put { table, key, value } => {
                    rocks_batch.put_cf(self.cf(table)?, key, value);
                }
                WriteOp::Delete { table, key } => {
                    rocks_batch.delete_cf(self.cf(table)?, key);
                }
            }
        }
        self.db.write(rocks_batch).map_err(storage_err)
    }
}
