// lib/src/config/mod.rs

pub mod config_constants;
pub mod config_defaults;
pub mod config_impl_clinic;
pub mod config_structs;

pub use config_constants::*;
pub use config_structs::{AdminSettings, ClinicConfig, SchedulingSettings, StorageEngineType, StorageSettings};
