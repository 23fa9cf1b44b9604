// models/src/medical/appointment.rs

use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::{ValidationError, ValidationResult};
use crate::identifiers::{RecordId, RecordKind};
use crate::rows::{self, cell, Row, TableRecord};

/// Placeholder used by the enrichment joins when the referenced record is gone.
pub const UNKNOWN: &str = "Unknown";

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 3] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }

    /// Statuses reachable from `self` in one step.
    pub fn allowed_transitions(&self) -> &'static [AppointmentStatus] {
        match self {
            AppointmentStatus::Scheduled => &[AppointmentStatus::Completed, AppointmentStatus::Cancelled],
            AppointmentStatus::Completed | AppointmentStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Whether an appointment in this status still holds its time slot.
    pub fn holds_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> ValidationResult<Self> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidStatus(s.to_string()))
    }
}

/// Input for booking an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: RecordId,
    pub doctor_id: RecordId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: RecordId,
    pub patient_id: RecordId,
    pub doctor_id: RecordId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: String,
    pub created_at: NaiveDateTime,
}

impl Appointment {
    /// Builds a freshly booked appointment. New bookings always start Scheduled.
    pub fn from_new(id: RecordId, new_appointment: NewAppointment, created_at: NaiveDateTime) -> Self {
        Appointment {
            id,
            patient_id: new_appointment.patient_id,
            doctor_id: new_appointment.doctor_id,
            date: new_appointment.date,
            time: new_appointment.time,
            status: AppointmentStatus::Scheduled,
            notes: new_appointment.notes,
            created_at,
        }
    }
}

impl TableRecord for Appointment {
    const TABLE: &'static str = "Appointments";
    const HEADERS: &'static [&'static str] = &[
        "AppointmentID",
        "PatientID",
        "DoctorID",
        "Date",
        "Time",
        "Status",
        "Notes",
        "CreatedAt",
    ];
    const KIND: RecordKind = RecordKind::Appointment;

    fn id(&self) -> RecordId {
        self.id
    }

    fn to_row(&self) -> Row {
        vec![
            self.id.to_string(),
            self.patient_id.to_string(),
            self.doctor_id.to_string(),
            rows::format_date(&self.date),
            rows::format_time(&self.time),
            self.status.to_string(),
            self.notes.clone(),
            rows::format_timestamp(&self.created_at),
        ]
    }

    fn from_row(row: &[String]) -> ValidationResult<Self> {
        Ok(Appointment {
            id: rows::id_cell(row, 0, Self::KIND)?,
            patient_id: rows::id_cell(row, 1, RecordKind::Patient)?,
            doctor_id: rows::id_cell(row, 2, RecordKind::Doctor)?,
            date: rows::parse_date(cell(row, 3))?,
            time: rows::parse_time(cell(row, 4))?,
            status: cell(row, 5).parse()?,
            notes: cell(row, 6).to_string(),
            created_at: rows::parse_timestamp(cell(row, 7))?,
        })
    }
}

/// Column of the status cell in the Appointments table.
pub const STATUS_COLUMN: usize = 5;

/// An appointment as a patient sees it, joined with the doctor's details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientAppointment {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor_name: String,
    pub specialty: String,
}

/// An appointment as a doctor sees it, joined with the patient's details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorAppointment {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient_name: String,
    pub patient_phone: String,
}
