// server/src/cli/mod.rs

pub mod cli;
pub mod commands;
pub mod handlers;

pub use cli::start_cli;
pub use commands::{AppointmentCommand, CliArgs, ClinicCommands, DoctorCommand, PatientCommand};
pub use handlers::{authorize_status_change, check_bookable};
