pub mod appointment;
pub mod doctor;
pub mod patient;

pub use appointment::{
    Appointment, AppointmentStatus, DoctorAppointment, NewAppointment, PatientAppointment, STATUS_COLUMN, UNKNOWN,
};
pub use doctor::{Doctor, NewDoctor};
pub use patient::{NewPatient, Patient};
