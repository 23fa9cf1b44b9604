// models/src/medical/patient.rs

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationResult;
use crate::identifiers::{RecordId, RecordKind};
use crate::rows::{self, cell, Row, TableRecord};

/// Input for registering a patient. Fields are stored as given; validating
/// them is the caller's job (see `validation::PatientRegistration`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
    pub medical_history: String,
}

/// A registered patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
    pub medical_history: String,
    pub registered_at: NaiveDateTime,
}

impl Patient {
    pub fn from_new(id: RecordId, new_patient: NewPatient, registered_at: NaiveDateTime) -> Self {
        Patient {
            id,
            name: new_patient.name,
            email: new_patient.email,
            phone: new_patient.phone,
            date_of_birth: new_patient.date_of_birth,
            address: new_patient.address,
            medical_history: new_patient.medical_history,
            registered_at,
        }
    }
}

impl TableRecord for Patient {
    const TABLE: &'static str = "Patients";
    const HEADERS: &'static [&'static str] = &[
        "PatientID",
        "Name",
        "Email",
        "Phone",
        "DateOfBirth",
        "Address",
        "MedicalHistory",
        "RegisteredDate",
    ];
    const KIND: RecordKind = RecordKind::Patient;

    fn id(&self) -> RecordId {
        self.id
    }

    fn to_row(&self) -> Row {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            rows::format_date(&self.date_of_birth),
            self.address.clone(),
            self.medical_history.clone(),
            rows::format_timestamp(&self.registered_at),
        ]
    }

    fn from_row(row: &[String]) -> ValidationResult<Self> {
        Ok(Patient {
            id: rows::id_cell(row, 0, Self::KIND)?,
            name: cell(row, 1).to_string(),
            email: rows::required(row, 2, Self::TABLE, Self::HEADERS)?.to_string(),
            phone: cell(row, 3).to_string(),
            date_of_birth: rows::parse_date(cell(row, 4))?,
            address: cell(row, 5).to_string(),
            medical_history: cell(row, 6).to_string(),
            registered_at: rows::parse_timestamp(cell(row, 7))?,
        })
    }
}
