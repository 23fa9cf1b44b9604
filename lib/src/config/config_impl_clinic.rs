// lib/src/config/config_impl_clinic.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use clinic_models::errors::{ClinicError, ClinicResult};

use crate::config::config_constants::*;
use crate::config::config_structs::ClinicConfig;

impl ClinicConfig {
    /// Parses a TOML document. Missing sections fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse clinic config TOML")
    }

    /// Reads the config file at `path`, or `clinic_config.toml` in the working
    /// directory when no path is given. A missing default file yields the
    /// defaults; a missing explicit file is an error. `.env` is loaded first
    /// and environment overrides are applied last. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if dotenvy::dotenv().is_ok() {
            debug!("Loaded environment from .env");
        }

        let mut config = match path {
            Some(explicit) => Self::load_file(explicit)?,
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_file(&default_path)?
                } else {
                    info!("Config file not found at {:?}, using defaults", default_path);
                    ClinicConfig::default()
                }
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read clinic config file {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid clinic config in {}", path.display()))?;
        info!("Loaded clinic configuration from {:?}", path);
        Ok(config)
    }

    /// Applies overrides found through `lookup` (normally the process
    /// environment). Unparseable engine names are ignored with a warning.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(store_name) = lookup(ENV_STORE_NAME) {
            self.storage.store_name = store_name;
        }
        if let Some(dir) = lookup(ENV_DATA_DIRECTORY) {
            self.storage.data_directory = PathBuf::from(dir);
        }
        if let Some(engine) = lookup(ENV_STORAGE_ENGINE) {
            match engine.parse() {
                Ok(engine_type) => self.storage.engine_type = engine_type,
                Err(e) => warn!("Ignoring {}: {}", ENV_STORAGE_ENGINE, e),
            }
        }
        if let Some(username) = lookup(ENV_ADMIN_USERNAME) {
            self.admin.username = username;
        }
        if let Some(password) = lookup(ENV_ADMIN_PASSWORD) {
            self.admin.password = password;
        }
    }

    pub fn validate(&self) -> ClinicResult<()> {
        let invalid = |msg: String| Err(ClinicError::ConfigurationError(msg));
        let scheduling = &self.scheduling;

        if self.storage.store_name.trim().is_empty() {
            return invalid("storage.store_name must not be empty".to_string());
        }
        if scheduling.working_hours_start > 23 {
            return invalid(format!("working_hours_start {} is not an hour of the day", scheduling.working_hours_start));
        }
        if scheduling.working_hours_end > 24 || scheduling.working_hours_end <= scheduling.working_hours_start {
            return invalid(format!(
                "working hours {}-{} do not form a working day",
                scheduling.working_hours_start, scheduling.working_hours_end
            ));
        }
        if scheduling.appointment_duration == 0 {
            return invalid("appointment_duration must be at least one minute".to_string());
        }
        if self.specialties.is_empty() {
            return invalid("at least one specialty must be configured".to_string());
        }
        if self.admin.username.trim().is_empty() {
            return invalid("admin.username must not be empty".to_string());
        }
        Ok(())
    }

    pub fn is_known_specialty(&self, specialty: &str) -> bool {
        self.specialties.iter().any(|s| s == specialty)
    }
}
