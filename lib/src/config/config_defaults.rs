// lib/src/config/config_defaults.rs

use std::path::PathBuf;

use crate::config::config_constants::*;
use crate::config::config_structs::StorageEngineType;

pub fn default_storage_engine_type() -> StorageEngineType { StorageEngineType::Sled }
pub fn default_data_directory() -> PathBuf { PathBuf::from(DEFAULT_DATA_DIRECTORY) }
pub fn default_store_name() -> String { DEFAULT_STORE_NAME.to_string() }

pub fn default_working_hours_start() -> u32 { DEFAULT_WORKING_HOURS_START }
pub fn default_working_hours_end() -> u32 { DEFAULT_WORKING_HOURS_END }
pub fn default_appointment_duration() -> u32 { DEFAULT_APPOINTMENT_DURATION_MINUTES }

pub fn default_specialties() -> Vec<String> {
    DEFAULT_SPECIALTIES.iter().map(|s| s.to_string()).collect()
}

pub fn default_admin_username() -> String { DEFAULT_ADMIN_USERNAME.to_string() }
pub fn default_admin_password() -> String { DEFAULT_ADMIN_PASSWORD.to_string() }
