// lib/src/storage_engine/mod.rs

pub mod inmemory_storage;
pub mod sled_storage;
pub mod storage_engine;

pub use inmemory_storage::InMemoryStorage;
pub use sled_storage::{open_sled_db, SledStorage};
pub use storage_engine::RowStorageEngine;

use std::sync::Arc;

use clinic_models::errors::ClinicResult;

use crate::config::{StorageEngineType, StorageSettings};

/// Creates a row store for the configured engine. Sled stores live under
/// `data_directory/store_name`.
pub fn create_storage(settings: &StorageSettings) -> ClinicResult<Arc<dyn RowStorageEngine>> {
    match settings.engine_type {
        StorageEngineType::Sled => {
            let storage = SledStorage::open(&settings.store_path())?;
            Ok(Arc::new(storage) as Arc<dyn RowStorageEngine>)
        }
        StorageEngineType::InMemory => Ok(Arc::new(InMemoryStorage::new()) as Arc<dyn RowStorageEngine>),
    }
}
