// lib/src/database.rs

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, error, info, warn};
use tokio::sync::Mutex;

use clinic_models::errors::{ClinicError, ClinicResult};
use clinic_models::identifiers::{RecordId, RecordKind};
use clinic_models::medical::{
    Appointment, AppointmentStatus, Doctor, DoctorAppointment, NewAppointment, NewDoctor, NewPatient, Patient,
    PatientAppointment, STATUS_COLUMN, UNKNOWN,
};
use clinic_models::rows::{self, cell, Row, TableRecord};

use crate::config::{SchedulingSettings, StorageSettings};
use crate::id_allocator::IdAllocator;
use crate::reports::AppointmentStats;
use crate::scheduling::working_day_slots;
use crate::storage_engine::{create_storage, RowStorageEngine};

const ID_COLUMN: usize = 0;
const DOCTOR_COLUMN: usize = 2;
const DATE_COLUMN: usize = 3;
const TIME_COLUMN: usize = 4;
const PATIENT_EMAIL_COLUMN: usize = 2;
const DOCTOR_EMAIL_COLUMN: usize = 3;

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Decodes every row of a table, skipping rows that do not parse.
fn decode_rows<T: TableRecord>(rows: &[Row]) -> Vec<T> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| match T::from_row(row) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping unreadable row {} in {}: {}", index, T::TABLE, e);
                None
            }
        })
        .collect()
}

/// Whether a stored appointment row holds `doctor_id`'s slot at `date`/`time`.
/// Only the slot and status cells are read, so a row with other damaged cells
/// still counts. Any status other than Cancelled holds the slot.
fn row_holds_slot(row: &[String], doctor_id: &RecordId, date: &NaiveDate, time: &NaiveTime) -> bool {
    let same_doctor = RecordId::parse_as(cell(row, DOCTOR_COLUMN), RecordKind::Doctor).is_ok_and(|id| &id == doctor_id);
    let same_date = rows::parse_date(cell(row, DATE_COLUMN)).is_ok_and(|d| &d == date);
    let same_time = rows::parse_time(cell(row, TIME_COLUMN)).is_ok_and(|t| &t == time);
    let held = cell(row, STATUS_COLUMN)
        .parse::<AppointmentStatus>()
        .map_or(true, |status| status.holds_slot());
    same_doctor && same_date && same_time && held
}

async fn load<T: TableRecord>(store: &dyn RowStorageEngine) -> ClinicResult<Vec<T>> {
    let rows = store.get_all_rows(T::TABLE).await?;
    Ok(decode_rows(&rows))
}

/// Creates any of the three tables that are missing.
async fn ensure_tables(store: &dyn RowStorageEngine) -> ClinicResult<()> {
    let existing = store.table_names().await?;
    let tables = [
        (Patient::TABLE, Patient::HEADERS),
        (Doctor::TABLE, Doctor::HEADERS),
        (Appointment::TABLE, Appointment::HEADERS),
    ];
    for (table, headers) in tables {
        if !existing.iter().any(|name| name == table) {
            store.create_table(table, headers).await?;
            info!("Created table {} in {} store", table, store.get_type());
        }
    }
    Ok(())
}

async fn allocate(
    store: &dyn RowStorageEngine,
    allocator: &mut IdAllocator,
    kind: RecordKind,
    table: &str,
) -> ClinicResult<RecordId> {
    let existing = store.column_values(table, ID_COLUMN).await?;
    allocator.next(kind, existing.iter().filter_map(|raw| RecordId::parse_as(raw, kind).ok()))
}

/// Appends a record built from a fresh identity, provided no row of the
/// table already carries `email`.
async fn insert_with_unique_email<T, F>(
    store: &dyn RowStorageEngine,
    allocator: &mut IdAllocator,
    email: &str,
    email_column: usize,
    build: F,
) -> ClinicResult<RecordId>
where
    T: TableRecord,
    F: FnOnce(RecordId) -> T,
{
    let wanted = normalize_email(email);
    let emails = store.column_values(T::TABLE, email_column).await?;
    if emails.iter().any(|existing| normalize_email(existing) == wanted) {
        return Err(ClinicError::DuplicateEmail(T::KIND));
    }
    let id = allocate(store, allocator, T::KIND, T::TABLE).await?;
    store.append_row(T::TABLE, build(id).to_row()).await?;
    store.flush().await?;
    Ok(id)
}

async fn insert_appointment(
    store: &dyn RowStorageEngine,
    allocator: &mut IdAllocator,
    new_appointment: NewAppointment,
) -> ClinicResult<RecordId> {
    let stored = store.get_all_rows(Appointment::TABLE).await?;
    let (doctor_id, date, time) = (new_appointment.doctor_id, new_appointment.date, new_appointment.time);
    if stored.iter().any(|row| row_holds_slot(row, &doctor_id, &date, &time)) {
        return Err(ClinicError::SlotConflict {
            doctor_id,
            date: rows::format_date(&date),
            time: rows::format_time(&time),
        });
    }
    let id = allocate(store, allocator, RecordKind::Appointment, Appointment::TABLE).await?;
    let appointment = Appointment::from_new(id, new_appointment, now());
    store.append_row(Appointment::TABLE, appointment.to_row()).await?;
    store.flush().await?;
    Ok(id)
}

async fn write_status(store: &dyn RowStorageEngine, id: &RecordId, status: AppointmentStatus) -> ClinicResult<()> {
    let rows = store.get_all_rows(Appointment::TABLE).await?;
    let (index, row) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| cell(row, ID_COLUMN).trim().parse::<RecordId>().ok().as_ref() == Some(id))
        .ok_or(ClinicError::NotFound(*id))?;

    let current: AppointmentStatus = cell(row, STATUS_COLUMN).parse()?;
    if !current.can_transition_to(status) {
        return Err(ClinicError::InvalidStatusTransition { from: current, to: status });
    }
    store.update_cell(Appointment::TABLE, index, STATUS_COLUMN, status.as_str()).await?;
    store.flush().await?;
    Ok(())
}

/// Logs the outcome of a write and attaches the operation name to faults.
fn finish_write<T>(result: ClinicResult<T>, operation: &'static str) -> ClinicResult<T> {
    result.map_err(|e| {
        if e.is_declined() {
            warn!("Declined {}: {}", operation, e);
        } else {
            error!("Failed {}: {}", operation, e);
        }
        e.during(operation)
    })
}

/// The clinic's record store: patients, doctors and appointments kept as rows
/// of three tables.
///
/// A database whose backend could not be opened is *inert*: reads return
/// empty results and writes fail with `ClinicError::ConnectionError`.
///
/// Writes are serialized by an internal gate, so the duplicate checks, the
/// slot-conflict check and identity allocation hold for every caller sharing
/// one instance. Reads take no gate and always see the tables as stored.
#[derive(Debug)]
pub struct ClinicDatabase {
    store: Option<Arc<dyn RowStorageEngine>>,
    write_gate: Mutex<IdAllocator>,
}

impl ClinicDatabase {
    /// Opens the configured backend and creates missing tables. Failures are
    /// logged and leave the database inert.
    pub async fn connect(settings: &StorageSettings) -> Self {
        let store = match create_storage(settings) {
            Ok(store) => store,
            Err(e) => {
                error!("Failed to open {} store at {:?}: {}", settings.engine_type, settings.store_path(), e);
                return Self::inert();
            }
        };
        match Self::with_store(store).await {
            Ok(db) => db,
            Err(e) => {
                error!("Failed to initialize clinic tables: {}", e);
                Self::inert()
            }
        }
    }

    /// Wraps an already opened backend, creating missing tables.
    pub async fn with_store(store: Arc<dyn RowStorageEngine>) -> ClinicResult<Self> {
        ensure_tables(store.as_ref()).await?;
        info!("Clinic record store ready on {} backend", store.get_type());
        Ok(ClinicDatabase { store: Some(store), write_gate: Mutex::new(IdAllocator::new()) })
    }

    pub fn inert() -> Self {
        ClinicDatabase { store: None, write_gate: Mutex::new(IdAllocator::new()) }
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_some()
    }

    pub fn backend_type(&self) -> Option<&'static str> {
        self.store.as_ref().map(|store| store.get_type())
    }

    fn writable(&self) -> ClinicResult<&Arc<dyn RowStorageEngine>> {
        self.store
            .as_ref()
            .ok_or_else(|| ClinicError::ConnectionError("record store is not connected".to_string()))
    }

    async fn records<T: TableRecord>(&self, operation: &'static str) -> ClinicResult<Vec<T>> {
        match &self.store {
            None => Ok(Vec::new()),
            Some(store) => {
                let records = load::<T>(store.as_ref()).await.map_err(|e| e.during(operation))?;
                debug!("Read {} rows from {}", records.len(), T::TABLE);
                Ok(records)
            }
        }
    }

    // --- Patients ---

    /// Registers a patient. The email must not belong to another patient.
    pub async fn add_patient(&self, new_patient: NewPatient) -> ClinicResult<RecordId> {
        let store = self.writable()?;
        let mut allocator = self.write_gate.lock().await;
        let email = new_patient.email.clone();
        let result = insert_with_unique_email(store.as_ref(), &mut allocator, &email, PATIENT_EMAIL_COLUMN, |id| {
            Patient::from_new(id, new_patient, now())
        })
        .await;
        let id = finish_write(result, "adding patient")?;
        info!("Registered patient {}", id);
        Ok(id)
    }

    pub async fn get_all_patients(&self) -> ClinicResult<Vec<Patient>> {
        self.records("fetching patients").await
    }

    pub async fn get_patient_by_id(&self, id: &RecordId) -> ClinicResult<Option<Patient>> {
        let patients: Vec<Patient> = self.records("fetching patient").await?;
        Ok(patients.into_iter().find(|p| &p.id == id))
    }

    pub async fn find_patient_by_email(&self, email: &str) -> ClinicResult<Option<Patient>> {
        let wanted = normalize_email(email);
        let patients: Vec<Patient> = self.records("fetching patient").await?;
        Ok(patients.into_iter().find(|p| normalize_email(&p.email) == wanted))
    }

    // --- Doctors ---

    /// Adds a doctor. The email must not belong to another doctor.
    pub async fn add_doctor(&self, new_doctor: NewDoctor) -> ClinicResult<RecordId> {
        let store = self.writable()?;
        let mut allocator = self.write_gate.lock().await;
        let email = new_doctor.email.clone();
        let result = insert_with_unique_email(store.as_ref(), &mut allocator, &email, DOCTOR_EMAIL_COLUMN, |id| {
            Doctor::from_new(id, new_doctor)
        })
        .await;
        let id = finish_write(result, "adding doctor")?;
        info!("Added doctor {}", id);
        Ok(id)
    }

    pub async fn get_all_doctors(&self) -> ClinicResult<Vec<Doctor>> {
        self.records("fetching doctors").await
    }

    /// Doctors whose specialty equals `specialty` exactly.
    pub async fn get_doctors_by_specialty(&self, specialty: &str) -> ClinicResult<Vec<Doctor>> {
        let doctors: Vec<Doctor> = self.records("fetching doctors").await?;
        Ok(doctors.into_iter().filter(|d| d.specialty == specialty).collect())
    }

    pub async fn find_doctor_by_email(&self, email: &str) -> ClinicResult<Option<Doctor>> {
        let wanted = normalize_email(email);
        let doctors: Vec<Doctor> = self.records("fetching doctor").await?;
        Ok(doctors.into_iter().find(|d| normalize_email(&d.email) == wanted))
    }

    // --- Appointments ---

    /// Books a slot. Fails with `SlotConflict` when the doctor already holds a
    /// non-cancelled appointment at the same date and time. Patient and doctor
    /// references are stored as given.
    pub async fn book_appointment(&self, new_appointment: NewAppointment) -> ClinicResult<RecordId> {
        let store = self.writable()?;
        let mut allocator = self.write_gate.lock().await;
        let result = insert_appointment(store.as_ref(), &mut allocator, new_appointment).await;
        let id = finish_write(result, "booking appointment")?;
        info!("Booked appointment {}", id);
        Ok(id)
    }

    pub async fn get_all_appointments(&self) -> ClinicResult<Vec<Appointment>> {
        self.records("fetching appointments").await
    }

    /// A patient's appointments with the doctor's name and specialty, or
    /// `Unknown` for both when the doctor record is missing.
    pub async fn get_patient_appointments(&self, patient_id: &RecordId) -> ClinicResult<Vec<PatientAppointment>> {
        let appointments: Vec<Appointment> = self.records("fetching appointments").await?;
        let doctors: Vec<Doctor> = self.records("fetching appointments").await?;
        let doctors: HashMap<RecordId, &Doctor> = doctors.iter().map(|d| (d.id, d)).collect();

        Ok(appointments
            .into_iter()
            .filter(|a| &a.patient_id == patient_id)
            .map(|appointment| {
                let (doctor_name, specialty) = match doctors.get(&appointment.doctor_id) {
                    Some(doctor) => (doctor.name.clone(), doctor.specialty.clone()),
                    None => (UNKNOWN.to_string(), UNKNOWN.to_string()),
                };
                PatientAppointment { appointment, doctor_name, specialty }
            })
            .collect())
    }

    /// A doctor's appointments, optionally on one date, with the patient's
    /// name and phone (`Unknown` when the patient record is missing).
    pub async fn get_doctor_appointments(
        &self,
        doctor_id: &RecordId,
        date: Option<NaiveDate>,
    ) -> ClinicResult<Vec<DoctorAppointment>> {
        let appointments: Vec<Appointment> = self.records("fetching appointments").await?;
        let patients: Vec<Patient> = self.records("fetching appointments").await?;
        let patients: HashMap<RecordId, &Patient> = patients.iter().map(|p| (p.id, p)).collect();

        Ok(appointments
            .into_iter()
            .filter(|a| &a.doctor_id == doctor_id && date.map_or(true, |d| a.date == d))
            .map(|appointment| {
                let (patient_name, patient_phone) = match patients.get(&appointment.patient_id) {
                    Some(patient) => (patient.name.clone(), patient.phone.clone()),
                    None => (UNKNOWN.to_string(), UNKNOWN.to_string()),
                };
                DoctorAppointment { appointment, patient_name, patient_phone }
            })
            .collect())
    }

    /// Moves an appointment to `status`. Only Scheduled appointments move, and
    /// only to Completed or Cancelled.
    pub async fn update_appointment_status(&self, id: &RecordId, status: AppointmentStatus) -> ClinicResult<()> {
        let store = self.writable()?;
        let _gate = self.write_gate.lock().await;
        let result = write_status(store.as_ref(), id, status).await;
        finish_write(result, "updating appointment")?;
        info!("Appointment {} is now {}", id, status);
        Ok(())
    }

    /// Free slot start times for a doctor on `date`. Cancelled appointments
    /// release their slot.
    pub async fn available_slots(
        &self,
        doctor_id: &RecordId,
        date: NaiveDate,
        scheduling: &SchedulingSettings,
    ) -> ClinicResult<Vec<NaiveTime>> {
        let stored = match &self.store {
            None => Vec::new(),
            Some(store) => store
                .get_all_rows(Appointment::TABLE)
                .await
                .map_err(|e| e.during("fetching appointments"))?,
        };
        Ok(working_day_slots(scheduling)
            .into_iter()
            .filter(|time| !stored.iter().any(|row| row_holds_slot(row, doctor_id, &date, time)))
            .collect())
    }

    pub async fn appointment_stats(&self) -> ClinicResult<AppointmentStats> {
        let patients: Vec<Patient> = self.records("computing statistics").await?;
        let doctors: Vec<Doctor> = self.records("computing statistics").await?;
        let appointments: Vec<Appointment> = self.records("computing statistics").await?;
        Ok(AppointmentStats::compute(&patients, &doctors, &appointments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::config::StorageEngineType;
    use crate::storage_engine::InMemoryStorage;

    fn patient(email: &str) -> NewPatient {
        NewPatient {
            name: "Ana Ruiz".to_string(),
            email: email.to_string(),
            phone: "5550001111".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 1).unwrap(),
            address: "1 Main St".to_string(),
            medical_history: String::new(),
        }
    }

    fn doctor(name: &str, specialty: &str, email: &str) -> NewDoctor {
        NewDoctor {
            name: name.to_string(),
            specialty: specialty.to_string(),
            email: email.to_string(),
            phone: "5551234567".to_string(),
            schedule: "Mon-Fri 9-5".to_string(),
        }
    }

    fn id(raw: &str) -> RecordId {
        RecordId::from_str(raw).unwrap()
    }

    fn booking(patient_id: &str, doctor_id: &str, date: &str, time: &str) -> NewAppointment {
        NewAppointment {
            patient_id: id(patient_id),
            doctor_id: id(doctor_id),
            date: rows::parse_date(date).unwrap(),
            time: rows::parse_time(time).unwrap(),
            notes: String::new(),
        }
    }

    async fn memory_db() -> ClinicDatabase {
        ClinicDatabase::with_store(Arc::new(InMemoryStorage::new())).await.unwrap()
    }

    fn raw_row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    /// Backend whose row reads and appends fail, as a lost disk would.
    #[derive(Debug, Default)]
    struct FailingStorage {
        tables: InMemoryStorage,
    }

    fn disk_failure() -> ClinicError {
        ClinicError::StorageError("disk unavailable".to_string())
    }

    #[async_trait]
    impl RowStorageEngine for FailingStorage {
        fn get_type(&self) -> &'static str {
            "Failing"
        }

        async fn table_names(&self) -> ClinicResult<Vec<String>> {
            self.tables.table_names().await
        }

        async fn create_table(&self, table: &str, headers: &[&str]) -> ClinicResult<()> {
            self.tables.create_table(table, headers).await
        }

        async fn headers(&self, table: &str) -> ClinicResult<Vec<String>> {
            self.tables.headers(table).await
        }

        async fn append_row(&self, _table: &str, _row: Row) -> ClinicResult<()> {
            Err(disk_failure())
        }

        async fn get_all_rows(&self, _table: &str) -> ClinicResult<Vec<Row>> {
            Err(disk_failure())
        }

        async fn update_cell(&self, table: &str, row_index: usize, column: usize, value: &str) -> ClinicResult<()> {
            self.tables.update_cell(table, row_index, column, value).await
        }

        async fn flush(&self) -> ClinicResult<()> {
            Ok(())
        }
    }

    fn sled_settings(dir: &TempDir) -> StorageSettings {
        StorageSettings {
            engine_type: StorageEngineType::Sled,
            data_directory: dir.path().to_path_buf(),
            store_name: "clinic".to_string(),
        }
    }

    #[tokio::test]
    async fn should_create_tables_with_headers() {
        let store = Arc::new(InMemoryStorage::new());
        ClinicDatabase::with_store(store.clone()).await.unwrap();
        assert_eq!(store.headers("Patients").await.unwrap(), Patient::HEADERS);
        assert_eq!(store.headers("Doctors").await.unwrap(), Doctor::HEADERS);
        assert_eq!(store.headers("Appointments").await.unwrap(), Appointment::HEADERS);

        // A second instance over the same tables leaves them alone.
        assert!(ClinicDatabase::with_store(store).await.is_ok());
    }

    #[tokio::test]
    async fn should_assign_increasing_patient_ids() {
        let db = memory_db().await;
        let first = db.add_patient(patient("ana@x.com")).await.unwrap();
        let second = db.add_patient(patient("ben@x.com")).await.unwrap();
        assert_eq!(first.to_string(), "P0001");
        assert_eq!(second.to_string(), "P0002");
        assert!(second > first);

        let stored = db.get_patient_by_id(&second).await.unwrap().unwrap();
        assert_eq!(stored.email, "ben@x.com");
        assert_eq!(db.get_all_patients().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn should_reject_duplicate_patient_email() {
        let db = memory_db().await;
        db.add_patient(patient("ana@x.com")).await.unwrap();
        let err = db.add_patient(patient("  ANA@x.com ")).await.unwrap_err();
        assert!(matches!(err, ClinicError::DuplicateEmail(RecordKind::Patient)));
        assert_eq!(err.to_string(), "Patient with this email already exists");
        assert_eq!(db.get_all_patients().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_keep_email_uniqueness_per_collection() {
        let db = memory_db().await;
        db.add_patient(patient("lee@x.com")).await.unwrap();
        db.add_doctor(doctor("Lee", "Cardiology", "lee@x.com")).await.unwrap();
        let err = db.add_doctor(doctor("Lee", "Cardiology", "lee@x.com")).await.unwrap_err();
        assert_eq!(err.to_string(), "Doctor with this email already exists");
    }

    #[tokio::test]
    async fn should_book_then_refuse_same_slot() {
        let db = memory_db().await;
        let doctor_id = db.add_doctor(doctor("Lee", "Cardiology", "lee@x.com")).await.unwrap();
        assert_eq!(doctor_id.to_string(), "D0001");

        let first = db.book_appointment(booking("P0001", "D0001", "2024-01-10", "09:00")).await.unwrap();
        assert_eq!(first.to_string(), "A0001");

        let err = db.book_appointment(booking("P0002", "D0001", "2024-01-10", "09:00")).await.unwrap_err();
        assert_eq!(err.to_string(), "This time slot is already booked");
        assert_eq!(db.get_all_appointments().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_release_slot_after_cancellation() {
        let db = memory_db().await;
        let first = db.book_appointment(booking("P0001", "D0001", "2024-01-10", "09:00")).await.unwrap();
        db.update_appointment_status(&first, AppointmentStatus::Cancelled).await.unwrap();

        let second = db.book_appointment(booking("P0002", "D0001", "2024-01-10", "09:00")).await.unwrap();
        assert_eq!(second.to_string(), "A0002");

        // Other doctors and other times never conflict.
        db.book_appointment(booking("P0001", "D0002", "2024-01-10", "09:00")).await.unwrap();
        db.book_appointment(booking("P0001", "D0001", "2024-01-10", "09:30")).await.unwrap();
    }

    #[tokio::test]
    async fn should_report_missing_appointment_without_mutation() {
        let db = memory_db().await;
        let booked = db.book_appointment(booking("P0001", "D0001", "2024-01-10", "09:00")).await.unwrap();
        let before = db.get_all_appointments().await.unwrap();

        let err = db.update_appointment_status(&id("A0042"), AppointmentStatus::Completed).await.unwrap_err();
        assert!(matches!(err, ClinicError::NotFound(missing) if missing == id("A0042")));
        assert_eq!(err.to_string(), "Appointment not found");
        assert_eq!(db.get_all_appointments().await.unwrap(), before);
        assert_eq!(before[0].id, booked);
    }

    #[tokio::test]
    async fn should_only_move_scheduled_appointments() {
        let db = memory_db().await;
        let booked = db.book_appointment(booking("P0001", "D0001", "2024-01-10", "09:00")).await.unwrap();

        let err = db.update_appointment_status(&booked, AppointmentStatus::Scheduled).await.unwrap_err();
        assert!(matches!(err, ClinicError::InvalidStatusTransition { .. }));

        db.update_appointment_status(&booked, AppointmentStatus::Completed).await.unwrap();
        let err = db.update_appointment_status(&booked, AppointmentStatus::Cancelled).await.unwrap_err();
        assert!(matches!(
            err,
            ClinicError::InvalidStatusTransition { from: AppointmentStatus::Completed, to: AppointmentStatus::Cancelled }
        ));

        let stored = db.get_all_appointments().await.unwrap();
        assert_eq!(stored[0].status, AppointmentStatus::Completed);
    }

    #[tokio::test]
    async fn should_return_empty_list_for_patient_without_appointments() {
        let db = memory_db().await;
        let patient_id = db.add_patient(patient("ana@x.com")).await.unwrap();
        assert!(db.get_patient_appointments(&patient_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_filter_doctors_by_exact_specialty() {
        let db = memory_db().await;
        let lee = db.add_doctor(doctor("Lee", "Cardiology", "lee@x.com")).await.unwrap();
        db.add_doctor(doctor("Kim", "Neurology", "kim@x.com")).await.unwrap();

        let cardiology = db.get_doctors_by_specialty("Cardiology").await.unwrap();
        assert_eq!(cardiology.iter().map(|d| d.id).collect::<Vec<_>>(), vec![lee]);
        assert!(db.get_doctors_by_specialty("Neurology").await.unwrap().iter().all(|d| d.id != lee));
        assert!(db.get_doctors_by_specialty("cardiology").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_join_doctor_details_or_unknown() {
        let db = memory_db().await;
        let patient_id = db.add_patient(patient("ana@x.com")).await.unwrap();
        let lee = db.add_doctor(doctor("Lee", "Cardiology", "lee@x.com")).await.unwrap();
        db.book_appointment(booking("P0001", &lee.to_string(), "2024-01-10", "09:00")).await.unwrap();
        db.book_appointment(booking("P0001", "D0099", "2024-01-11", "10:00")).await.unwrap();

        let joined = db.get_patient_appointments(&patient_id).await.unwrap();
        assert_eq!(joined.len(), 2);
        assert_eq!((joined[0].doctor_name.as_str(), joined[0].specialty.as_str()), ("Lee", "Cardiology"));
        assert_eq!((joined[1].doctor_name.as_str(), joined[1].specialty.as_str()), (UNKNOWN, UNKNOWN));
    }

    #[tokio::test]
    async fn should_filter_doctor_schedule_by_date() {
        let db = memory_db().await;
        db.add_patient(patient("ana@x.com")).await.unwrap();
        db.book_appointment(booking("P0001", "D0001", "2024-01-10", "09:00")).await.unwrap();
        db.book_appointment(booking("P0007", "D0001", "2024-01-11", "09:00")).await.unwrap();
        db.book_appointment(booking("P0001", "D0002", "2024-01-10", "11:00")).await.unwrap();

        let all = db.get_doctor_appointments(&id("D0001"), None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].patient_name, "Ana Ruiz");
        assert_eq!(all[1].patient_name, UNKNOWN);
        assert_eq!(all[1].patient_phone, UNKNOWN);

        let day = rows::parse_date("2024-01-11").unwrap();
        let on_day = db.get_doctor_appointments(&id("D0001"), Some(day)).await.unwrap();
        assert_eq!(on_day.len(), 1);
        assert_eq!(on_day[0].appointment.date, day);
    }

    #[tokio::test]
    async fn should_offer_only_free_slots() {
        let db = memory_db().await;
        let scheduling = SchedulingSettings::default();
        let taken = db.book_appointment(booking("P0001", "D0001", "2024-01-10", "09:00")).await.unwrap();
        db.book_appointment(booking("P0001", "D0001", "2024-01-10", "09:30")).await.unwrap();
        db.update_appointment_status(&taken, AppointmentStatus::Cancelled).await.unwrap();

        let date = rows::parse_date("2024-01-10").unwrap();
        let slots = db.available_slots(&id("D0001"), date, &scheduling).await.unwrap();
        assert_eq!(slots.len(), 15);
        assert!(slots.contains(&rows::parse_time("09:00").unwrap()));
        assert!(!slots.contains(&rows::parse_time("09:30").unwrap()));
        assert_eq!(db.available_slots(&id("D0002"), date, &scheduling).await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn should_summarize_appointments() {
        let db = memory_db().await;
        db.add_patient(patient("ana@x.com")).await.unwrap();
        db.add_doctor(doctor("Lee", "Cardiology", "lee@x.com")).await.unwrap();
        let done = db.book_appointment(booking("P0001", "D0001", "2024-01-10", "09:00")).await.unwrap();
        db.book_appointment(booking("P0001", "D0005", "2024-01-10", "10:00")).await.unwrap();
        db.update_appointment_status(&done, AppointmentStatus::Completed).await.unwrap();

        let stats = db.appointment_stats().await.unwrap();
        assert_eq!((stats.total_patients, stats.total_doctors, stats.total_appointments), (1, 1, 2));
        assert_eq!(stats.count_for(AppointmentStatus::Completed), 1);
        assert_eq!(stats.count_for(AppointmentStatus::Scheduled), 1);
        assert_eq!(stats.by_specialty.get("Cardiology"), Some(&1));
        assert_eq!(stats.by_specialty.get(UNKNOWN), Some(&1));
    }

    #[tokio::test]
    async fn should_find_records_by_email_ignoring_case() {
        let db = memory_db().await;
        let ana = db.add_patient(patient("ana@x.com")).await.unwrap();
        let lee = db.add_doctor(doctor("Lee", "Cardiology", "lee@x.com")).await.unwrap();
        assert_eq!(db.find_patient_by_email("ANA@x.com").await.unwrap().map(|p| p.id), Some(ana));
        assert_eq!(db.find_doctor_by_email("lee@x.com ").await.unwrap().map(|d| d.id), Some(lee));
        assert!(db.find_doctor_by_email("ana@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_continue_after_existing_rows_and_skip_unreadable_ones() {
        let store = Arc::new(InMemoryStorage::new());
        let db = ClinicDatabase::with_store(store.clone()).await.unwrap();
        let mut seeded = patient("old@x.com");
        seeded.name = "Old Record".to_string();
        let old = Patient::from_new(id("P0007"), seeded, now());
        store.append_row("Patients", old.to_row()).await.unwrap();
        store.append_row("Patients", vec!["garbage".to_string(), "x".to_string()]).await.unwrap();

        let next = db.add_patient(patient("new@x.com")).await.unwrap();
        assert_eq!(next.to_string(), "P0008");
        let patients = db.get_all_patients().await.unwrap();
        assert_eq!(patients.iter().map(|p| p.id.to_string()).collect::<Vec<_>>(), vec!["P0007", "P0008"]);
    }

    #[tokio::test]
    async fn should_reject_unparseable_status_cell() {
        let store = Arc::new(InMemoryStorage::new());
        let db = ClinicDatabase::with_store(store.clone()).await.unwrap();
        let booked = db.book_appointment(booking("P0001", "D0001", "2024-01-10", "09:00")).await.unwrap();
        store.update_cell("Appointments", 0, STATUS_COLUMN, "Pending").await.unwrap();

        let err = db.update_appointment_status(&booked, AppointmentStatus::Completed).await.unwrap_err();
        assert!(matches!(err, ClinicError::Validation(_)));
    }

    #[tokio::test]
    async fn should_stay_inert_when_backend_cannot_open() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-directory");
        std::fs::write(&blocker, b"x").unwrap();
        let settings = StorageSettings {
            engine_type: StorageEngineType::Sled,
            data_directory: blocker,
            store_name: "clinic".to_string(),
        };

        let db = ClinicDatabase::connect(&settings).await;
        assert!(!db.is_connected());
        assert_eq!(db.backend_type(), None);
        assert!(db.get_all_patients().await.unwrap().is_empty());
        assert!(db.get_patient_by_id(&id("P0001")).await.unwrap().is_none());
        assert!(db.get_doctor_appointments(&id("D0001"), None).await.unwrap().is_empty());

        let err = db.add_doctor(doctor("Lee", "Cardiology", "lee@x.com")).await.unwrap_err();
        assert!(matches!(err, ClinicError::ConnectionError(_)));
        assert_eq!(err.to_string(), "Database connection error");
        let err = db.update_appointment_status(&id("A0001"), AppointmentStatus::Completed).await.unwrap_err();
        assert!(matches!(err, ClinicError::ConnectionError(_)));
    }

    #[tokio::test]
    async fn should_persist_records_in_sled_store() {
        let dir = TempDir::new().unwrap();
        {
            let db = ClinicDatabase::connect(&sled_settings(&dir)).await;
            assert_eq!(db.backend_type(), Some("Sled"));
            db.add_doctor(doctor("Lee", "Cardiology", "lee@x.com")).await.unwrap();
            db.book_appointment(booking("P0001", "D0001", "2024-01-10", "09:00")).await.unwrap();
        }

        let db = ClinicDatabase::connect(&sled_settings(&dir)).await;
        assert!(db.is_connected());
        assert_eq!(db.get_all_doctors().await.unwrap()[0].name, "Lee");
        let next = db.add_doctor(doctor("Kim", "Neurology", "kim@x.com")).await.unwrap();
        assert_eq!(next.to_string(), "D0002");
        let err = db.book_appointment(booking("P0002", "D0001", "2024-01-10", "09:00")).await.unwrap_err();
        assert!(matches!(err, ClinicError::SlotConflict { .. }));
    }

    #[tokio::test]
    async fn should_admit_one_of_concurrent_bookings_for_a_slot() {
        let db = Arc::new(memory_db().await);
        let mut handles = Vec::new();
        for patient_seq in 1..=8 {
            let db = Arc::clone(&db);
            handles.push(tokio::spawn(async move {
                let patient_id = RecordId::new(RecordKind::Patient, patient_seq).to_string();
                db.book_appointment(booking(&patient_id, "D0001", "2024-01-10", "09:00")).await
            }));
        }

        let mut booked = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                booked += 1;
            }
        }
        assert_eq!(booked, 1);
        assert_eq!(db.get_all_appointments().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_treat_partial_scheduled_row_as_holding_slot() {
        let store = Arc::new(InMemoryStorage::new());
        let db = ClinicDatabase::with_store(store.clone()).await.unwrap();
        store
            .append_row(
                "Appointments",
                raw_row(&["A0001", "P0001", "D0001", "2024-01-10", "09:00", "Scheduled", ""]),
            )
            .await
            .unwrap();

        let err = db.book_appointment(booking("P0002", "D0001", "2024-01-10", "09:00")).await.unwrap_err();
        assert!(matches!(err, ClinicError::SlotConflict { .. }));

        let date = rows::parse_date("2024-01-10").unwrap();
        let slots = db.available_slots(&id("D0001"), date, &SchedulingSettings::default()).await.unwrap();
        assert!(!slots.contains(&rows::parse_time("09:00").unwrap()));
    }

    #[tokio::test]
    async fn should_hold_slot_for_unrecognized_status() {
        let store = Arc::new(InMemoryStorage::new());
        let db = ClinicDatabase::with_store(store.clone()).await.unwrap();
        store
            .append_row(
                "Appointments",
                raw_row(&["A0001", "P0001", "D0001", "2024-01-10", "09:00", "Pending", "", "2024-01-02 08:00:00"]),
            )
            .await
            .unwrap();
        store
            .append_row(
                "Appointments",
                raw_row(&["A0002", "P0001", "D0001", "2024-01-10", "09:30", "cancelled", "", "2024-01-02 08:00:00"]),
            )
            .await
            .unwrap();

        assert!(db.book_appointment(booking("P0002", "D0001", "2024-01-10", "09:00")).await.is_err());
        let rebooked = db.book_appointment(booking("P0002", "D0001", "2024-01-10", "09:30")).await.unwrap();
        assert_eq!(rebooked.to_string(), "A0003");
    }

    #[tokio::test]
    async fn should_name_operation_when_backend_write_fails() {
        let db = ClinicDatabase::with_store(Arc::new(FailingStorage::default())).await.unwrap();

        let err = db.add_patient(patient("ana@x.com")).await.unwrap_err();
        assert!(matches!(err, ClinicError::Operation { operation: "adding patient", .. }));
        assert_eq!(err.to_string(), "Error adding patient: Storage error: disk unavailable");

        let err = db.book_appointment(booking("P0001", "D0001", "2024-01-10", "09:00")).await.unwrap_err();
        assert!(matches!(err, ClinicError::Operation { operation: "booking appointment", .. }));
    }

    #[tokio::test]
    async fn should_surface_backend_read_failure_instead_of_empty_list() {
        let db = ClinicDatabase::with_store(Arc::new(FailingStorage::default())).await.unwrap();
        assert!(db.is_connected());

        let err = db.get_all_doctors().await.unwrap_err();
        assert!(matches!(err, ClinicError::Operation { operation: "fetching doctors", .. }));
        assert!(err.to_string().contains("disk unavailable"));

        let date = rows::parse_date("2024-01-10").unwrap();
        let err = db.available_slots(&id("D0001"), date, &SchedulingSettings::default()).await.unwrap_err();
        assert!(matches!(err, ClinicError::Operation { operation: "fetching appointments", .. }));
    }
}
