// models/src/validation.rs

//! Input checks applied by callers before records reach the store. The store
//! itself stores whatever it is handed.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::errors::{ValidationError, ValidationResult};
use crate::medical::{NewDoctor, NewPatient};
use crate::rows;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("valid email regex"));
static UNSAFE_CHARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>"';]"#).expect("valid sanitizer regex"));

pub const MIN_PASSWORD_LEN: usize = 8;
pub const PHONE_DIGITS: usize = 10;

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Accepts any formatting as long as exactly ten digits remain.
pub fn validate_phone(phone: &str) -> bool {
    phone.chars().filter(char::is_ascii_digit).count() == PHONE_DIGITS
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Strips characters commonly used for markup or query injection.
pub fn sanitize_input(text: &str) -> String {
    UNSAFE_CHARS_RE.replace_all(text, "").into_owned()
}

fn require(value: &str, field: &'static str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

fn check_contact(email: &str, phone: &str) -> ValidationResult<()> {
    if !validate_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if !validate_phone(phone) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(())
}

/// Patient self-registration form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientRegistration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub address: String,
    #[serde(default)]
    pub medical_history: String,
    pub password: String,
    pub confirm_password: String,
}

impl PatientRegistration {
    /// Checks the form and returns the sanitized record input.
    pub fn validate(&self) -> ValidationResult<NewPatient> {
        require(&self.name, "name")?;
        require(&self.email, "email")?;
        require(&self.phone, "phone")?;
        require(&self.date_of_birth, "date of birth")?;
        require(&self.address, "address")?;
        require(&self.password, "password")?;
        check_contact(self.email.trim(), &self.phone)?;
        let date_of_birth = rows::parse_date(&self.date_of_birth)?;
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if !is_valid_password(&self.password) {
            return Err(ValidationError::WeakPassword);
        }

        Ok(NewPatient {
            name: sanitize_input(self.name.trim()),
            email: sanitize_input(self.email.trim()),
            phone: sanitize_input(self.phone.trim()),
            date_of_birth,
            address: sanitize_input(self.address.trim()),
            medical_history: sanitize_input(self.medical_history.trim()),
        })
    }
}

/// Administrator's add-doctor form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorRegistration {
    pub name: String,
    pub specialty: String,
    pub email: String,
    pub phone: String,
    pub schedule: String,
    pub password: String,
}

impl DoctorRegistration {
    /// Checks the form against the configured specialty list and returns the
    /// sanitized record input.
    pub fn validate(&self, specialties: &[String]) -> ValidationResult<NewDoctor> {
        require(&self.name, "name")?;
        require(&self.email, "email")?;
        require(&self.phone, "phone")?;
        require(&self.specialty, "specialty")?;
        require(&self.schedule, "schedule")?;
        require(&self.password, "password")?;
        check_contact(self.email.trim(), &self.phone)?;
        if !is_valid_password(&self.password) {
            return Err(ValidationError::WeakPassword);
        }
        if !specialties.iter().any(|s| s == &self.specialty) {
            return Err(ValidationError::UnknownSpecialty(self.specialty.clone()));
        }

        Ok(NewDoctor {
            name: sanitize_input(self.name.trim()),
            specialty: self.specialty.clone(),
            email: sanitize_input(self.email.trim()),
            phone: sanitize_input(self.phone.trim()),
            schedule: sanitize_input(self.schedule.trim()),
        })
    }
}
