// server/src/cli/handlers.rs

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use crossterm::style::Stylize;
use log::info;
use serde::Serialize;

use clinic_lib::config::{ClinicConfig, SchedulingSettings};
use clinic_lib::scheduling::{calculate_age, format_date_for_display, next_available_dates, working_day_slots};
use clinic_lib::session::{Role, Session, SessionUser};
use clinic_lib::ClinicDatabase;
use clinic_models::errors::{ClinicError, ClinicResult};
use clinic_models::identifiers::{RecordId, RecordKind};
use clinic_models::medical::{Appointment, AppointmentStatus, NewAppointment};
use clinic_models::rows::{format_date, format_time, parse_date, parse_time};
use clinic_models::validation::{DoctorRegistration, PatientRegistration};

use crate::cli::commands::{AdminCredentials, AppointmentCommand, DoctorCommand, PatientCommand};

fn parse_id(raw: &str, kind: RecordKind) -> Result<RecordId> {
    RecordId::parse_as(raw, kind).with_context(|| format!("'{}' is not a {} ID", raw, kind))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_success(message: String) {
    println!("{}", message.green());
}

fn admin_session(config: &ClinicConfig, credentials: &AdminCredentials) -> Result<Session> {
    let mut session = Session::new();
    session.login_admin(&config.admin, &credentials.username, &credentials.password)?;
    Ok(session)
}

/// Whether `user` may move `appointment` to `status`. Doctors manage their own
/// appointments; patients may only cancel theirs.
pub fn authorize_status_change(
    user: &SessionUser,
    appointment: &Appointment,
    status: AppointmentStatus,
) -> ClinicResult<()> {
    match user.role {
        Role::Admin => Ok(()),
        Role::Doctor if appointment.doctor_id.to_string() == user.id => Ok(()),
        Role::Doctor => Err(ClinicError::PermissionDenied(
            "Doctors may only update their own appointments".to_string(),
        )),
        Role::Patient if appointment.patient_id.to_string() != user.id => Err(ClinicError::PermissionDenied(
            "Patients may only change their own appointments".to_string(),
        )),
        Role::Patient if status != AppointmentStatus::Cancelled => Err(ClinicError::PermissionDenied(
            "Patients may only cancel appointments".to_string(),
        )),
        Role::Patient => Ok(()),
    }
}

/// A booking must be for today or later and start on a working-day slot.
pub fn check_bookable(date: NaiveDate, time: NaiveTime, today: NaiveDate, scheduling: &SchedulingSettings) -> Result<()> {
    if date < today {
        anyhow::bail!("Appointments cannot be booked in the past ({})", format_date(&date));
    }
    if !working_day_slots(scheduling).contains(&time) {
        anyhow::bail!(
            "{} is not a bookable slot; slots run from {:02}:00 to {:02}:00 every {} minutes",
            format_time(&time),
            scheduling.working_hours_start,
            scheduling.working_hours_end,
            scheduling.appointment_duration
        );
    }
    Ok(())
}

pub async fn handle_patient_command(command: PatientCommand, db: &ClinicDatabase, json: bool) -> Result<()> {
    match command {
        PatientCommand::Register(args) => {
            let registration = PatientRegistration {
                name: args.name,
                email: args.email,
                phone: args.phone,
                date_of_birth: args.date_of_birth,
                address: args.address,
                medical_history: args.medical_history,
                password: args.password,
                confirm_password: args.confirm_password,
            };
            let new_patient = registration.validate()?;
            let id = db.add_patient(new_patient).await?;
            print_success(format!("Registration successful! Your patient ID is {}", id));
        }
        PatientCommand::List => {
            let patients = db.get_all_patients().await?;
            if json {
                return print_json(&patients);
            }
            let today = Local::now().date_naive();
            println!("\n--- Patients ({}) ---", patients.len());
            println!("{:<8} {:<25} {:<30} {:<12} {:<5}", "ID", "Name", "Email", "Phone", "Age");
            println!("{:-<8} {:-<25} {:-<30} {:-<12} {:-<5}", "", "", "", "", "");
            for p in &patients {
                println!(
                    "{:<8} {:<25} {:<30} {:<12} {:<5}",
                    p.id,
                    p.name,
                    p.email,
                    p.phone,
                    calculate_age(p.date_of_birth, today)
                );
            }
        }
        PatientCommand::Show { id } => {
            let id = parse_id(&id, RecordKind::Patient)?;
            let patient = db.get_patient_by_id(&id).await?.ok_or(ClinicError::NotFound(id))?;
            if json {
                return print_json(&patient);
            }
            println!("{:<16} {}", "Patient ID:", patient.id);
            println!("{:<16} {}", "Name:", patient.name);
            println!("{:<16} {}", "Email:", patient.email);
            println!("{:<16} {}", "Phone:", patient.phone);
            println!("{:<16} {}", "Date of birth:", format_date_for_display(patient.date_of_birth));
            println!("{:<16} {}", "Address:", patient.address);
            println!("{:<16} {}", "History:", patient.medical_history);
            println!("{:<16} {}", "Registered:", patient.registered_at);
        }
        PatientCommand::Appointments { id } => {
            let id = parse_id(&id, RecordKind::Patient)?;
            let appointments = db.get_patient_appointments(&id).await?;
            if json {
                return print_json(&appointments);
            }
            if appointments.is_empty() {
                println!("No appointments found.");
                return Ok(());
            }
            println!("{:<8} {:<12} {:<6} {:<20} {:<18} {:<10}", "ID", "Date", "Time", "Doctor", "Specialty", "Status");
            println!("{:-<8} {:-<12} {:-<6} {:-<20} {:-<18} {:-<10}", "", "", "", "", "", "");
            for a in &appointments {
                println!(
                    "{:<8} {:<12} {:<6} {:<20} {:<18} {:<10}",
                    a.appointment.id,
                    format_date(&a.appointment.date),
                    format_time(&a.appointment.time),
                    a.doctor_name,
                    a.specialty,
                    a.appointment.status
                );
            }
        }
    }
    Ok(())
}

pub async fn handle_doctor_command(
    command: DoctorCommand,
    config: &ClinicConfig,
    db: &ClinicDatabase,
    json: bool,
) -> Result<()> {
    match command {
        DoctorCommand::Add(args) => {
            let session = admin_session(config, &args.admin)?;
            session.require_role(Role::Admin)?;
            let registration = DoctorRegistration {
                name: args.name,
                specialty: args.specialty,
                email: args.email,
                phone: args.phone,
                schedule: args.schedule,
                password: args.password,
            };
            let new_doctor = registration.validate(&config.specialties)?;
            let id = db.add_doctor(new_doctor).await?;
            print_success(format!("Doctor added successfully with ID {}", id));
        }
        DoctorCommand::List { specialty } => {
            let doctors = match &specialty {
                Some(specialty) => db.get_doctors_by_specialty(specialty).await?,
                None => db.get_all_doctors().await?,
            };
            if json {
                return print_json(&doctors);
            }
            println!("{:<8} {:<25} {:<18} {:<30} {:<20}", "ID", "Name", "Specialty", "Email", "Schedule");
            println!("{:-<8} {:-<25} {:-<18} {:-<30} {:-<20}", "", "", "", "", "");
            for d in &doctors {
                println!("{:<8} {:<25} {:<18} {:<30} {:<20}", d.id, d.name, d.specialty, d.email, d.schedule);
            }
        }
        DoctorCommand::Schedule { id, date } => {
            let id = parse_id(&id, RecordKind::Doctor)?;
            let date = date.as_deref().map(parse_date).transpose()?;
            let appointments = db.get_doctor_appointments(&id, date).await?;
            if json {
                return print_json(&appointments);
            }
            if let Some(date) = date {
                println!("Schedule for {} on {}", id, format_date_for_display(date));
            }
            if appointments.is_empty() {
                println!("No appointments found.");
                return Ok(());
            }
            println!("{:<8} {:<12} {:<6} {:<25} {:<12} {:<10}", "ID", "Date", "Time", "Patient", "Phone", "Status");
            println!("{:-<8} {:-<12} {:-<6} {:-<25} {:-<12} {:-<10}", "", "", "", "", "", "");
            for a in &appointments {
                println!(
                    "{:<8} {:<12} {:<6} {:<25} {:<12} {:<10}",
                    a.appointment.id,
                    format_date(&a.appointment.date),
                    format_time(&a.appointment.time),
                    a.patient_name,
                    a.patient_phone,
                    a.appointment.status
                );
            }
        }
    }
    Ok(())
}

pub async fn handle_appointment_command(
    command: AppointmentCommand,
    config: &ClinicConfig,
    db: &ClinicDatabase,
    json: bool,
) -> Result<()> {
    match command {
        AppointmentCommand::Book { patient, doctor, date, time, notes } => {
            let new_appointment = NewAppointment {
                patient_id: parse_id(&patient, RecordKind::Patient)?,
                doctor_id: parse_id(&doctor, RecordKind::Doctor)?,
                date: parse_date(&date)?,
                time: parse_time(&time)?,
                notes,
            };
            check_bookable(
                new_appointment.date,
                new_appointment.time,
                Local::now().date_naive(),
                &config.scheduling,
            )?;
            let id = db.book_appointment(new_appointment).await?;
            print_success(format!("Appointment booked successfully! Appointment ID: {}", id));
        }
        AppointmentCommand::Status { id, status, as_doctor, as_patient, password } => {
            let id = parse_id(&id, RecordKind::Appointment)?;
            let status: AppointmentStatus = status.parse()?;

            let mut session = Session::new();
            match (as_doctor, as_patient) {
                (Some(email), _) => session.login_doctor(db, &email, &password).await?,
                (None, Some(email)) => session.login_patient(db, &email, &password).await?,
                (None, None) => anyhow::bail!("Sign in with --as-doctor or --as-patient"),
            };
            let user = session.user().context("no signed-in user")?;

            let appointment = db
                .get_all_appointments()
                .await?
                .into_iter()
                .find(|a| a.id == id)
                .ok_or(ClinicError::NotFound(id))?;
            authorize_status_change(user, &appointment, status)?;
            db.update_appointment_status(&id, status).await?;
            info!("{} {} set {} to {}", user.role, user.id, id, status);
            print_success(format!("Appointment {} marked as {}", id, status));
        }
        AppointmentCommand::Slots { doctor, date, days } => {
            let doctor = parse_id(&doctor, RecordKind::Doctor)?;
            let dates = match date {
                Some(date) => vec![parse_date(&date)?],
                None => next_available_dates(Local::now().date_naive(), days),
            };
            let mut listing: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for date in &dates {
                let slots = db.available_slots(&doctor, *date, &config.scheduling).await?;
                listing.insert(format_date(date), slots.iter().map(format_time).collect());
            }
            if json {
                return print_json(&listing);
            }
            for date in &dates {
                println!("Available slots for {} on {}:", doctor, format_date_for_display(*date));
                match listing.get(&format_date(date)) {
                    Some(slots) if !slots.is_empty() => println!("  {}", slots.join("  ")),
                    _ => println!("  (fully booked)"),
                }
            }
        }
    }
    Ok(())
}

pub async fn handle_stats(
    credentials: AdminCredentials,
    config: &ClinicConfig,
    db: &ClinicDatabase,
    json: bool,
) -> Result<()> {
    let session = admin_session(config, &credentials)?;
    session.require_role(Role::Admin)?;
    let stats = db.appointment_stats().await?;
    if json {
        return print_json(&stats);
    }
    println!("\n--- Clinic Statistics ---");
    println!("{:<22} {}", "Total patients:", stats.total_patients);
    println!("{:<22} {}", "Total doctors:", stats.total_doctors);
    println!("{:<22} {}", "Total appointments:", stats.total_appointments);
    println!("\nBy status:");
    for status in AppointmentStatus::ALL {
        println!("  {:<20} {}", status, stats.count_for(status));
    }
    println!("\nBy specialty:");
    for (specialty, count) in &stats.by_specialty {
        println!("  {:<20} {}", specialty, count);
    }
    println!("\nBy date:");
    for (date, count) in &stats.by_date {
        println!("  {:<20} {}", format_date(date), count);
    }
    Ok(())
}

pub fn handle_specialties(config: &ClinicConfig, json: bool) -> Result<()> {
    if json {
        return print_json(&config.specialties);
    }
    for specialty in &config.specialties {
        println!("{}", specialty);
    }
    Ok(())
}
