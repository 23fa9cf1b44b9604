// lib/src/lib.rs

//! Clinic record store: configuration, row storage backends, the
//! `ClinicDatabase` itself, scheduling helpers, reports and sessions.
//! Shared record types live in the `clinic_models` crate.

pub mod config;
pub mod database;
pub mod id_allocator;
pub mod reports;
pub mod scheduling;
pub mod session;
pub mod storage_engine;

pub use clinic_models::errors::{ClinicError, ClinicResult};
pub use clinic_models::{
    Appointment, AppointmentStatus, Doctor, DoctorAppointment, NewAppointment, NewDoctor, NewPatient, Patient,
    PatientAppointment, RecordId, RecordKind,
};

pub use crate::config::ClinicConfig;
pub use crate::database::ClinicDatabase;
pub use crate::reports::AppointmentStats;
pub use crate::session::{Role, Session, SessionUser};
pub use crate::storage_engine::{create_storage, InMemoryStorage, RowStorageEngine, SledStorage};
