// lib/src/reports.rs

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use clinic_models::identifiers::RecordId;
use clinic_models::medical::{Appointment, AppointmentStatus, Doctor, Patient, UNKNOWN};

/// Aggregate counts for the administrator's dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppointmentStats {
    pub total_patients: usize,
    pub total_doctors: usize,
    pub total_appointments: usize,
    pub by_status: BTreeMap<AppointmentStatus, usize>,
    /// Keyed by the booked doctor's specialty; `Unknown` when the doctor is gone.
    pub by_specialty: BTreeMap<String, usize>,
    pub by_date: BTreeMap<NaiveDate, usize>,
}

impl AppointmentStats {
    pub fn compute(patients: &[Patient], doctors: &[Doctor], appointments: &[Appointment]) -> Self {
        let specialties: HashMap<RecordId, &str> =
            doctors.iter().map(|d| (d.id, d.specialty.as_str())).collect();

        let mut stats = AppointmentStats {
            total_patients: patients.len(),
            total_doctors: doctors.len(),
            total_appointments: appointments.len(),
            ..AppointmentStats::default()
        };
        for appointment in appointments {
            *stats.by_status.entry(appointment.status).or_insert(0) += 1;
            let specialty = specialties.get(&appointment.doctor_id).copied().unwrap_or(UNKNOWN);
            *stats.by_specialty.entry(specialty.to_string()).or_insert(0) += 1;
            *stats.by_date.entry(appointment.date).or_insert(0) += 1;
        }
        stats
    }

    pub fn count_for(&self, status: AppointmentStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}
