// lib/src/storage_engine/inmemory_storage.rs

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use clinic_models::errors::ClinicResult;
use clinic_models::rows::Row;

use super::storage_engine::{row_out_of_range, set_cell, table_exists, table_not_found, RowStorageEngine};

#[derive(Debug, Default, Clone)]
struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

/// Volatile row store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage::default()
    }
}

#[async_trait]
impl RowStorageEngine for InMemoryStorage {
    fn get_type(&self) -> &'static str {
        "InMemory"
    }

    async fn table_names(&self) -> ClinicResult<Vec<String>> {
        let tables = self.tables.read().await;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn create_table(&self, table: &str, headers: &[&str]) -> ClinicResult<()> {
        let mut tables = self.tables.write().await;
        if tables.contains_key(table) {
            return Err(table_exists(table));
        }
        tables.insert(
            table.to_string(),
            Table { headers: headers.iter().map(|h| h.to_string()).collect(), rows: Vec::new() },
        );
        Ok(())
    }

    async fn headers(&self, table: &str) -> ClinicResult<Vec<String>> {
        let tables = self.tables.read().await;
        tables.get(table).map(|t| t.headers.clone()).ok_or_else(|| table_not_found(table))
    }

    async fn append_row(&self, table: &str, row: Row) -> ClinicResult<()> {
        let mut tables = self.tables.write().await;
        let entry = tables.get_mut(table).ok_or_else(|| table_not_found(table))?;
        entry.rows.push(row);
        Ok(())
    }

    async fn get_all_rows(&self, table: &str) -> ClinicResult<Vec<Row>> {
        let tables = self.tables.read().await;
        tables.get(table).map(|t| t.rows.clone()).ok_or_else(|| table_not_found(table))
    }

    async fn update_cell(&self, table: &str, row_index: usize, column: usize, value: &str) -> ClinicResult<()> {
        let mut tables = self.tables.write().await;
        let entry = tables.get_mut(table).ok_or_else(|| table_not_found(table))?;
        let row = entry.rows.get_mut(row_index).ok_or_else(|| row_out_of_range(table, row_index))?;
        set_cell(row, column, value);
        Ok(())
    }

    async fn flush(&self) -> ClinicResult<()> {
        Ok(())
    }

    async fn row_count(&self, table: &str) -> ClinicResult<usize> {
        let tables = self.tables.read().await;
        tables.get(table).map(|t| t.rows.len()).ok_or_else(|| table_not_found(table))
    }
}
