// lib/src/config/config_constants.rs

pub const APP_NAME: &str = "Medical Appointment Booking System";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_CONFIG_FILE: &str = "clinic_config.toml";
pub const DEFAULT_DATA_DIRECTORY: &str = "./clinic_data";
pub const DEFAULT_STORE_NAME: &str = "clinic";

pub const DEFAULT_WORKING_HOURS_START: u32 = 9;
pub const DEFAULT_WORKING_HOURS_END: u32 = 17;
pub const DEFAULT_APPOINTMENT_DURATION_MINUTES: u32 = 30;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

pub const DEFAULT_SPECIALTIES: &[&str] = &[
    "General Medicine",
    "Cardiology",
    "Dermatology",
    "Orthopedics",
    "Pediatrics",
    "Neurology",
    "Gynecology",
    "Ophthalmology",
    "Dentistry",
    "Psychiatry",
];

// Environment overrides, applied after the config file.
pub const ENV_STORE_NAME: &str = "SPREADSHEET_ID";
pub const ENV_DATA_DIRECTORY: &str = "CLINIC_DATA_DIRECTORY";
pub const ENV_STORAGE_ENGINE: &str = "CLINIC_STORAGE_ENGINE";
pub const ENV_ADMIN_USERNAME: &str = "ADMIN_USERNAME";
pub const ENV_ADMIN_PASSWORD: &str = "ADMIN_PASSWORD";
