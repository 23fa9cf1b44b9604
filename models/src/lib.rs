// models/src/lib.rs

//! Shared record types for the clinic record store: identities, the three
//! record kinds, their row layout, input validation and the error types used
//! across the workspace.

pub mod errors;
pub mod identifiers;
pub mod medical;
pub mod rows;
pub mod validation;

pub use errors::{ClinicError, ClinicResult, ValidationError, ValidationResult};
pub use identifiers::{RecordId, RecordKind};
pub use medical::{
    Appointment, AppointmentStatus, Doctor, DoctorAppointment, NewAppointment, NewDoctor, NewPatient, Patient,
    PatientAppointment,
};
pub use rows::{Row, TableRecord};
