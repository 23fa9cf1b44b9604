// server/src/cli/commands.rs

// Command-line arguments and subcommands for the clinic CLI.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "clinic-cli")]
#[command(version)]
#[command(about = "Medical appointment booking: patients, doctors and appointments")]
pub struct CliArgs {
    /// Config file (defaults to ./clinic_config.toml when present)
    #[arg(long, short = 'c', global = true, env = "CLINIC_CONFIG", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: ClinicCommands,
}

#[derive(Debug, Subcommand)]
pub enum ClinicCommands {
    /// Patient registration and records
    Patient(PatientCommandWrapper),
    /// Doctor management and schedules
    Doctor(DoctorCommandWrapper),
    /// Booking and appointment status
    Appointment(AppointmentCommandWrapper),
    /// Aggregate statistics (administrator only)
    Stats(AdminCredentials),
    /// List the configured specialties
    Specialties,
}

#[derive(Debug, Args)]
pub struct PatientCommandWrapper {
    #[clap(subcommand)]
    pub command: PatientCommand,
}

#[derive(Debug, Args)]
pub struct DoctorCommandWrapper {
    #[clap(subcommand)]
    pub command: DoctorCommand,
}

#[derive(Debug, Args)]
pub struct AppointmentCommandWrapper {
    #[clap(subcommand)]
    pub command: AppointmentCommand,
}

#[derive(Debug, Args, Clone, PartialEq)]
pub struct AdminCredentials {
    #[clap(long = "admin-user")]
    pub username: String,
    #[clap(long = "admin-password")]
    pub password: String,
}

#[derive(Debug, Args, Clone, PartialEq)]
pub struct RegisterPatientArgs {
    #[clap(long)]
    pub name: String,
    #[clap(long)]
    pub email: String,
    #[clap(long)]
    pub phone: String,
    /// YYYY-MM-DD
    #[clap(long = "dob")]
    pub date_of_birth: String,
    #[clap(long)]
    pub address: String,
    #[clap(long = "history", default_value = "")]
    pub medical_history: String,
    #[clap(long)]
    pub password: String,
    #[clap(long)]
    pub confirm_password: String,
}

#[derive(Debug, Args, Clone, PartialEq)]
pub struct AddDoctorArgs {
    #[clap(flatten)]
    pub admin: AdminCredentials,
    #[clap(long)]
    pub name: String,
    #[clap(long)]
    pub specialty: String,
    #[clap(long)]
    pub email: String,
    #[clap(long)]
    pub phone: String,
    /// Free-text availability, e.g. "Mon-Fri 9-5"
    #[clap(long)]
    pub schedule: String,
    #[clap(long)]
    pub password: String,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum PatientCommand {
    Register(RegisterPatientArgs),
    List,
    Show {
        #[arg(value_name = "PATIENT_ID")]
        id: String,
    },
    Appointments {
        #[arg(value_name = "PATIENT_ID")]
        id: String,
    },
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum DoctorCommand {
    Add(AddDoctorArgs),
    List {
        #[clap(long)]
        specialty: Option<String>,
    },
    Schedule {
        #[arg(value_name = "DOCTOR_ID")]
        id: String,
        /// Only this day (YYYY-MM-DD)
        #[clap(long)]
        date: Option<String>,
    },
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum AppointmentCommand {
    Book {
        #[clap(long)]
        patient: String,
        #[clap(long)]
        doctor: String,
        /// YYYY-MM-DD
        #[clap(long)]
        date: String,
        /// HH:MM, one of the working-day slots
        #[clap(long)]
        time: String,
        #[clap(long, default_value = "")]
        notes: String,
    },
    Status {
        #[arg(value_name = "APPOINTMENT_ID")]
        id: String,
        /// Completed or Cancelled
        #[arg(value_name = "STATUS")]
        status: String,
        /// Sign in as the doctor with this email
        #[clap(long, conflicts_with = "as_patient", required_unless_present = "as_patient")]
        as_doctor: Option<String>,
        /// Sign in as the patient with this email
        #[clap(long)]
        as_patient: Option<String>,
        #[clap(long)]
        password: String,
    },
    Slots {
        #[clap(long)]
        doctor: String,
        /// YYYY-MM-DD; without it the coming `--days` days are listed
        #[clap(long)]
        date: Option<String>,
        #[clap(long, default_value_t = 7)]
        days: u32,
    },
}
