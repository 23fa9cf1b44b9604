// models/src/medical/doctor.rs

use serde::{Deserialize, Serialize};

use crate::errors::ValidationResult;
use crate::identifiers::{RecordId, RecordKind};
use crate::rows::{self, cell, Row, TableRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDoctor {
    pub name: String,
    pub specialty: String,
    pub email: String,
    pub phone: String,
    pub schedule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: RecordId,
    pub name: String,
    pub specialty: String,
    pub email: String,
    pub phone: String,
    /// Free-text availability, e.g. "Mon-Fri 9-5".
    pub schedule: String,
}

impl Doctor {
    pub fn from_new(id: RecordId, new_doctor: NewDoctor) -> Self {
        Doctor {
            id,
            name: new_doctor.name,
            specialty: new_doctor.specialty,
            email: new_doctor.email,
            phone: new_doctor.phone,
            schedule: new_doctor.schedule,
        }
    }
}

impl TableRecord for Doctor {
    const TABLE: &'static str = "Doctors";
    const HEADERS: &'static [&'static str] = &["DoctorID", "Name", "Specialty", "Email", "Phone", "Schedule"];
    const KIND: RecordKind = RecordKind::Doctor;

    fn id(&self) -> RecordId {
        self.id
    }

    fn to_row(&self) -> Row {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.specialty.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.schedule.clone(),
        ]
    }

    fn from_row(row: &[String]) -> ValidationResult<Self> {
        Ok(Doctor {
            id: rows::id_cell(row, 0, Self::KIND)?,
            name: cell(row, 1).to_string(),
            specialty: cell(row, 2).to_string(),
            email: rows::required(row, 3, Self::TABLE, Self::HEADERS)?.to_string(),
            phone: cell(row, 4).to_string(),
            schedule: cell(row, 5).to_string(),
        })
    }
}
