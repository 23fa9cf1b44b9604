// models/src/errors.rs

use std::io;
pub use thiserror::Error;

use crate::identifiers::{RecordId, RecordKind};
use crate::medical::AppointmentStatus;

#[derive(Debug, Error)]
pub enum ClinicError {
    #[error("Database connection error")]
    ConnectionError(String),

    #[error("{0} with this email already exists")]
    DuplicateEmail(RecordKind),

    #[error("This time slot is already booked")]
    SlotConflict {
        doctor_id: RecordId,
        date: String,
        time: String,
    },

    #[error("{} not found", .0.kind())]
    NotFound(RecordId),

    #[error("Cannot change appointment status from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    /// A lower-level failure caught at an operation boundary. The raw message
    /// of the underlying error is kept in the display form.
    #[error("Error {operation}: {source}")]
    Operation {
        operation: &'static str,
        #[source]
        source: Box<ClinicError>,
    },

    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[cfg(feature = "sled-errors")]
    #[error(transparent)]
    Sled(#[from] sled::Error),
    #[cfg(feature = "bincode-errors")]
    #[error(transparent)]
    BincodeDecode(#[from] bincode::error::DecodeError),
    #[cfg(feature = "bincode-errors")]
    #[error(transparent)]
    BincodeEncode(#[from] bincode::error::EncodeError),
}

impl ClinicError {
    /// Wraps a lower-level failure with the name of the operation it broke.
    /// Declined operations (duplicates, conflicts, missing records) pass through
    /// unchanged so callers can still match on them.
    pub fn during(self, operation: &'static str) -> Self {
        match self {
            ClinicError::ConnectionError(_)
            | ClinicError::DuplicateEmail(_)
            | ClinicError::SlotConflict { .. }
            | ClinicError::NotFound(_)
            | ClinicError::InvalidStatusTransition { .. }
            | ClinicError::Validation(_)
            | ClinicError::Operation { .. } => self,
            other => ClinicError::Operation {
                operation,
                source: Box::new(other),
            },
        }
    }

    /// True for failures that decline a request rather than report a fault.
    pub fn is_declined(&self) -> bool {
        matches!(
            self,
            ClinicError::DuplicateEmail(_)
                | ClinicError::SlotConflict { .. }
                | ClinicError::NotFound(_)
                | ClinicError::InvalidStatusTransition { .. }
        )
    }
}

impl From<serde_json::Error> for ClinicError {
    fn from(err: serde_json::Error) -> Self {
        ClinicError::SerializationError(format!("JSON processing error: {}", err))
    }
}

impl From<anyhow::Error> for ClinicError {
    fn from(err: anyhow::Error) -> Self {
        ClinicError::StorageError(format!("Underlying storage operation failed: {}", err))
    }
}

/// A validation error.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// An identity string does not have the `<prefix><digits>` shape.
    #[error("identifier '{0}' is invalid")]
    InvalidIdentifier(String),
    /// An identity carries the prefix of a different collection.
    #[error("identifier '{found}' is not a {expected} identifier")]
    WrongIdentifierKind { expected: RecordKind, found: String },
    /// An invalid date was provided; dates use `YYYY-MM-DD`.
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
    /// An invalid time was provided; times use `HH:MM`.
    #[error("invalid time format: {0}")]
    InvalidTimeFormat(String),
    #[error("invalid timestamp format: {0}")]
    InvalidTimestampFormat(String),
    #[error("unknown appointment status '{0}'")]
    InvalidStatus(String),
    /// A stored row is missing a cell that every record must carry.
    #[error("row in {table} has no value for {column}")]
    MissingCell { table: &'static str, column: &'static str },
    #[error("Please fill in all required fields (missing {0})")]
    MissingField(&'static str),
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter a valid 10-digit phone number")]
    InvalidPhone,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least 8 characters with at least one uppercase letter, one lowercase letter, and one digit")]
    WeakPassword,
    #[error("unknown specialty '{0}'")]
    UnknownSpecialty(String),
}

/// A type alias for a `Result` that returns a `ClinicError` on failure.
pub type ClinicResult<T> = Result<T, ClinicError>;

/// A type alias for a `Result` that returns a `ValidationError` on failure.
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_render_declined_messages() {
        assert_eq!(
            ClinicError::DuplicateEmail(RecordKind::Patient).to_string(),
            "Patient with this email already exists"
        );
        assert_eq!(
            ClinicError::DuplicateEmail(RecordKind::Doctor).to_string(),
            "Doctor with this email already exists"
        );
        let missing = RecordId::new(RecordKind::Appointment, 7);
        assert_eq!(ClinicError::NotFound(missing).to_string(), "Appointment not found");
    }

    #[test]
    fn should_wrap_storage_failures_with_operation() {
        let err = ClinicError::StorageError("disk full".to_string()).during("booking appointment");
        assert_eq!(err.to_string(), "Error booking appointment: Storage error: disk full");
    }

    #[test]
    fn should_not_wrap_declined_failures() {
        let err = ClinicError::DuplicateEmail(RecordKind::Doctor).during("adding doctor");
        assert!(matches!(err, ClinicError::DuplicateEmail(RecordKind::Doctor)));
        assert!(err.is_declined());
    }
}
