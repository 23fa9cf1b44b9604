// lib/src/config/config_structs.rs

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use derivative::Derivative;
use serde::{Deserialize, Serialize};

use crate::config::config_defaults::*;

/// Storage engine types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngineType {
    Sled,
    InMemory,
}

impl FromStr for StorageEngineType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sled" => Ok(StorageEngineType::Sled),
            "inmemory" | "in-memory" | "memory" => Ok(StorageEngineType::InMemory),
            _ => Err(anyhow::anyhow!("Unknown storage engine type: {}", s)),
        }
    }
}

impl fmt::Display for StorageEngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageEngineType::Sled => write!(f, "sled"),
            StorageEngineType::InMemory => write!(f, "inmemory"),
        }
    }
}

/// Where and how the record store keeps its tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageSettings {
    #[serde(default = "default_storage_engine_type")]
    pub engine_type: StorageEngineType,
    #[serde(default = "default_data_directory")]
    pub data_directory: PathBuf,
    /// Identity of the store. Sled keeps it as a directory under
    /// `data_directory`.
    #[serde(default = "default_store_name")]
    pub store_name: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            engine_type: default_storage_engine_type(),
            data_directory: default_data_directory(),
            store_name: default_store_name(),
        }
    }
}

impl StorageSettings {
    pub fn store_path(&self) -> PathBuf {
        self.data_directory.join(&self.store_name)
    }
}

/// Working day and slot grid used when offering appointment times.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchedulingSettings {
    #[serde(default = "default_working_hours_start")]
    pub working_hours_start: u32,
    #[serde(default = "default_working_hours_end")]
    pub working_hours_end: u32,
    /// Slot length in minutes.
    #[serde(default = "default_appointment_duration")]
    pub appointment_duration: u32,
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        SchedulingSettings {
            working_hours_start: default_working_hours_start(),
            working_hours_end: default_working_hours_end(),
            appointment_duration: default_appointment_duration(),
        }
    }
}

#[derive(Derivative, Clone, Serialize, Deserialize, PartialEq)]
#[derivative(Debug)]
pub struct AdminSettings {
    #[serde(default = "default_admin_username")]
    pub username: String,
    #[serde(default = "default_admin_password")]
    #[derivative(Debug = "ignore")]
    pub password: String,
}

impl Default for AdminSettings {
    fn default() -> Self {
        AdminSettings { username: default_admin_username(), password: default_admin_password() }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicConfig {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub scheduling: SchedulingSettings,
    #[serde(default = "default_specialties")]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub admin: AdminSettings,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        ClinicConfig {
            storage: StorageSettings::default(),
            scheduling: SchedulingSettings::default(),
            specialties: default_specialties(),
            admin: AdminSettings::default(),
        }
    }
}
