// lib/src/storage_engine/storage_engine.rs

use std::fmt::Debug;

use async_trait::async_trait;

use clinic_models::errors::{ClinicError, ClinicResult};
use clinic_models::rows::{cell, Row};

/// A row-oriented table store: named tables, each with a header row and an
/// append-only list of data rows. Row indexes are 0-based and exclude the
/// header.
#[async_trait]
pub trait RowStorageEngine: Send + Sync + Debug {
    fn get_type(&self) -> &'static str;

    async fn table_names(&self) -> ClinicResult<Vec<String>>;

    /// Creates an empty table with the given header row. Fails if the table
    /// already exists.
    async fn create_table(&self, table: &str, headers: &[&str]) -> ClinicResult<()>;

    async fn headers(&self, table: &str) -> ClinicResult<Vec<String>>;

    async fn append_row(&self, table: &str, row: Row) -> ClinicResult<()>;

    async fn get_all_rows(&self, table: &str) -> ClinicResult<Vec<Row>>;

    /// Overwrites one cell in place. Short rows are padded with empty cells.
    async fn update_cell(&self, table: &str, row_index: usize, column: usize, value: &str) -> ClinicResult<()>;

    async fn flush(&self) -> ClinicResult<()>;

    /// All values of one column, header excluded.
    async fn column_values(&self, table: &str, column: usize) -> ClinicResult<Vec<String>> {
        let rows = self.get_all_rows(table).await?;
        Ok(rows.iter().map(|row| cell(row, column).to_string()).collect())
    }

    async fn row_count(&self, table: &str) -> ClinicResult<usize> {
        Ok(self.get_all_rows(table).await?.len())
    }
}

pub(crate) fn table_not_found(table: &str) -> ClinicError {
    ClinicError::StorageError(format!("Worksheet {} not found", table))
}

pub(crate) fn table_exists(table: &str) -> ClinicError {
    ClinicError::StorageError(format!("A worksheet with the name \"{}\" already exists", table))
}

pub(crate) fn row_out_of_range(table: &str, row_index: usize) -> ClinicError {
    ClinicError::StorageError(format!("Row {} is out of range in worksheet {}", row_index, table))
}

pub(crate) fn set_cell(row: &mut Row, column: usize, value: &str) {
    if row.len() <= column {
        row.resize(column + 1, String::new());
    }
    row[column] = value.to_string();
}
