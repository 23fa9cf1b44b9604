// lib/src/storage_engine/sled_storage.rs

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bincode::config::{self, BigEndian, Configuration, Fixint};
use bincode::serde::{decode_from_slice, encode_to_vec};
use derivative::Derivative;
use log::{debug, error, info};
use sled::{Db, Tree};

use clinic_models::errors::{ClinicError, ClinicResult};
use clinic_models::rows::Row;

use super::storage_engine::{row_out_of_range, set_cell, table_exists, table_not_found, RowStorageEngine};

/// Tree mapping table name to its encoded header row.
const HEADERS_TREE: &str = "__headers__";
const TABLE_TREE_PREFIX: &str = "table:";

/// Provides a standard bincode configuration.
fn bincode_config() -> Configuration<BigEndian, Fixint> {
    config::standard().with_big_endian().with_fixed_int_encoding()
}

fn row_key(index: u64) -> [u8; 8] {
    index.to_be_bytes()
}

fn key_index(key: &[u8]) -> ClinicResult<u64> {
    let bytes: [u8; 8] = key
        .try_into()
        .map_err(|_| ClinicError::DeserializationError(format!("row key has {} bytes, expected 8", key.len())))?;
    Ok(u64::from_be_bytes(bytes))
}

/// Opens (or creates) a sled database directory.
pub fn open_sled_db(path: &Path) -> ClinicResult<Db> {
    std::fs::create_dir_all(path).map_err(|e| {
        error!("Failed to create database directory at {:?}: {}", path, e);
        ClinicError::StorageError(format!("Failed to create database directory at {:?}: {}", path, e))
    })?;
    let db = sled::Config::new().path(path).open().map_err(|e| {
        error!("Failed to open Sled database at {:?}: {}", path, e);
        ClinicError::StorageError(format!("Failed to open Sled database at {:?}: {}", path, e))
    })?;
    info!("Opened Sled database at {:?}", path);
    Ok(db)
}

/// Durable row store. Each table is a sled tree whose keys are big-endian row
/// indexes, so iteration order is insertion order.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct SledStorage {
    db: Db,
    headers: Tree,
    path: Option<PathBuf>,
    #[derivative(Debug = "ignore")]
    config: Configuration<BigEndian, Fixint>,
}

impl SledStorage {
    pub fn new(db: Db, path: Option<PathBuf>) -> ClinicResult<Self> {
        let headers = db.open_tree(HEADERS_TREE)?;
        Ok(SledStorage { db, headers, path, config: bincode_config() })
    }

    pub fn open(path: &Path) -> ClinicResult<Self> {
        let db = open_sled_db(path)?;
        Self::new(db, Some(path.to_path_buf()))
    }

    /// A sled database removed when dropped.
    pub fn temporary() -> ClinicResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::new(db, None)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn encode(&self, cells: &[String]) -> ClinicResult<Vec<u8>> {
        Ok(encode_to_vec(cells, self.config)?)
    }

    fn decode(&self, bytes: &[u8]) -> ClinicResult<Row> {
        let (row, _): (Row, usize) = decode_from_slice(bytes, self.config)?;
        Ok(row)
    }

    /// Opens the tree of an existing table.
    fn table(&self, table: &str) -> ClinicResult<Tree> {
        if !self.headers.contains_key(table.as_bytes())? {
            return Err(table_not_found(table));
        }
        Ok(self.db.open_tree(format!("{}{}", TABLE_TREE_PREFIX, table))?)
    }
}

#[async_trait]
impl RowStorageEngine for SledStorage {
    fn get_type(&self) -> &'static str {
        "Sled"
    }

    async fn table_names(&self) -> ClinicResult<Vec<String>> {
        self.headers
            .iter()
            .keys()
            .map(|key| {
                let key = key?;
                String::from_utf8(key.to_vec())
                    .map_err(|e| ClinicError::DeserializationError(format!("table name is not UTF-8: {}", e)))
            })
            .collect()
    }

    async fn create_table(&self, table: &str, headers: &[&str]) -> ClinicResult<()> {
        let header_row: Row = headers.iter().map(|h| h.to_string()).collect();
        let encoded = self.encode(&header_row)?;
        let inserted = self
            .headers
            .compare_and_swap(table.as_bytes(), None as Option<&[u8]>, Some(encoded))?;
        if inserted.is_err() {
            return Err(table_exists(table));
        }
        self.db.open_tree(format!("{}{}", TABLE_TREE_PREFIX, table))?;
        debug!("Created sled table {} with headers {:?}", table, headers);
        Ok(())
    }

    async fn headers(&self, table: &str) -> ClinicResult<Vec<String>> {
        match self.headers.get(table.as_bytes())? {
            Some(bytes) => self.decode(&bytes),
            None => Err(table_not_found(table)),
        }
    }

    async fn append_row(&self, table: &str, row: Row) -> ClinicResult<()> {
        let tree = self.table(table)?;
        let next = match tree.last()? {
            Some((key, _)) => key_index(&key)? + 1,
            None => 0,
        };
        tree.insert(row_key(next), self.encode(&row)?)?;
        Ok(())
    }

    async fn get_all_rows(&self, table: &str) -> ClinicResult<Vec<Row>> {
        let tree = self.table(table)?;
        tree.iter().values().map(|value| self.decode(&value?)).collect()
    }

    async fn update_cell(&self, table: &str, row_index: usize, column: usize, value: &str) -> ClinicResult<()> {
        let tree = self.table(table)?;
        let key = row_key(row_index as u64);
        let mut row = match tree.get(key)? {
            Some(bytes) => self.decode(&bytes)?,
            None => return Err(row_out_of_range(table, row_index)),
        };
        set_cell(&mut row, column, value);
        tree.insert(key, self.encode(&row)?)?;
        Ok(())
    }

    async fn flush(&self) -> ClinicResult<()> {
        let bytes = self.db.flush_async().await?;
        debug!("Flushed {} bytes to sled", bytes);
        Ok(())
    }

    async fn row_count(&self, table: &str) -> ClinicResult<usize> {
        Ok(self.table(table)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn should_keep_rows_in_insertion_order() {
        let store = SledStorage::temporary().unwrap();
        store.create_table("Doctors", &["DoctorID", "Name"]).await.unwrap();
        for i in 1..=12 {
            store.append_row("Doctors", row(&[&format!("D{:04}", i), "Doc"])).await.unwrap();
        }
        let ids = store.column_values("Doctors", 0).await.unwrap();
        assert_eq!(ids.len(), 12);
        assert_eq!(ids.first().map(String::as_str), Some("D0001"));
        assert_eq!(ids.last().map(String::as_str), Some("D0012"));
    }

    #[tokio::test]
    async fn should_refuse_to_recreate_table() {
        let store = SledStorage::temporary().unwrap();
        store.create_table("Patients", &["PatientID"]).await.unwrap();
        assert!(store.create_table("Patients", &["Other"]).await.is_err());
        assert_eq!(store.headers("Patients").await.unwrap(), row(&["PatientID"]));
        assert!(store.get_all_rows("Doctors").await.is_err());
    }

    #[tokio::test]
    async fn should_persist_tables_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clinic");
        {
            let store = SledStorage::open(&path).unwrap();
            store.create_table("Appointments", &["AppointmentID", "Status"]).await.unwrap();
            store.append_row("Appointments", row(&["A0001", "Scheduled"])).await.unwrap();
            store.update_cell("Appointments", 0, 1, "Cancelled").await.unwrap();
            store.flush().await.unwrap();
        }

        let reopened = SledStorage::open(&path).unwrap();
        assert_eq!(reopened.table_names().await.unwrap(), vec!["Appointments".to_string()]);
        assert_eq!(
            reopened.get_all_rows("Appointments").await.unwrap(),
            vec![row(&["A0001", "Cancelled"])]
        );
        assert_eq!(reopened.path(), Some(path.as_path()));
    }
}
