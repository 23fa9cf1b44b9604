// server/src/cli/cli.rs

// Main CLI entry point: loads configuration, opens the record store and
// dispatches the parsed command.
use anyhow::Result;
use clap::Parser;
use log::{info, warn};

use clinic_lib::config::{ClinicConfig, APP_NAME, APP_VERSION};
use clinic_lib::ClinicDatabase;

use crate::cli::commands::{CliArgs, ClinicCommands};
use crate::cli::handlers::{
    handle_appointment_command, handle_doctor_command, handle_patient_command, handle_specialties, handle_stats,
};

pub async fn start_cli() -> Result<()> {
    let args = CliArgs::parse();
    let config = ClinicConfig::load(args.config.as_deref())?;
    info!("{} v{} using {} storage", APP_NAME, APP_VERSION, config.storage.engine_type);

    if let ClinicCommands::Specialties = args.command {
        return handle_specialties(&config, args.json);
    }

    let db = ClinicDatabase::connect(&config.storage).await;
    if !db.is_connected() {
        warn!("Record store unavailable at {:?}; reads will be empty", config.storage.store_path());
    }

    match args.command {
        ClinicCommands::Patient(wrapper) => handle_patient_command(wrapper.command, &db, args.json).await,
        ClinicCommands::Doctor(wrapper) => handle_doctor_command(wrapper.command, &config, &db, args.json).await,
        ClinicCommands::Appointment(wrapper) => {
            handle_appointment_command(wrapper.command, &config, &db, args.json).await
        }
        ClinicCommands::Stats(credentials) => handle_stats(credentials, &config, &db, args.json).await,
        ClinicCommands::Specialties => handle_specialties(&config, args.json),
    }
}
