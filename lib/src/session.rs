// lib/src/session.rs

use std::fmt;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use clinic_models::errors::{ClinicError, ClinicResult};

use crate::config::AdminSettings;
use crate::database::ClinicDatabase;

pub const ADMIN_USER_ID: &str = "admin_id";
pub const ADMIN_DISPLAY_NAME: &str = "Admin User";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Patient => write!(f, "patient"),
            Role::Doctor => write!(f, "doctor"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub role: Role,
    pub id: String,
    pub name: String,
}

fn require_credentials(identifier: &str, password: &str) -> ClinicResult<()> {
    if identifier.trim().is_empty() || password.is_empty() {
        return Err(ClinicError::AuthenticationError("Please enter both email and password".to_string()));
    }
    Ok(())
}

fn invalid_login() -> ClinicError {
    ClinicError::AuthenticationError("Invalid email or password".to_string())
}

/// Who is acting on the record store. Passed explicitly to anything that
/// needs to know.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<SessionUser>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Signs in a registered patient. Patients carry no stored password, so
    /// any non-empty password is accepted for a known email.
    pub async fn login_patient(&mut self, db: &ClinicDatabase, email: &str, password: &str) -> ClinicResult<&SessionUser> {
        require_credentials(email, password)?;
        let patient = db.find_patient_by_email(email).await?.ok_or_else(|| {
            warn!("Patient login failed for {}", email.trim());
            invalid_login()
        })?;
        Ok(self.start(SessionUser { role: Role::Patient, id: patient.id.to_string(), name: patient.name }))
    }

    pub async fn login_doctor(&mut self, db: &ClinicDatabase, email: &str, password: &str) -> ClinicResult<&SessionUser> {
        require_credentials(email, password)?;
        let doctor = db.find_doctor_by_email(email).await?.ok_or_else(|| {
            warn!("Doctor login failed for {}", email.trim());
            invalid_login()
        })?;
        Ok(self.start(SessionUser { role: Role::Doctor, id: doctor.id.to_string(), name: doctor.name }))
    }

    pub fn login_admin(&mut self, admin: &AdminSettings, username: &str, password: &str) -> ClinicResult<&SessionUser> {
        if username != admin.username || password != admin.password {
            warn!("Admin login failed for {}", username);
            return Err(ClinicError::AuthenticationError("Invalid admin credentials".to_string()));
        }
        Ok(self.start(SessionUser {
            role: Role::Admin,
            id: ADMIN_USER_ID.to_string(),
            name: ADMIN_DISPLAY_NAME.to_string(),
        }))
    }

    fn start(&mut self, user: SessionUser) -> &SessionUser {
        info!("{} {} logged in", user.role, user.id);
        self.user.insert(user)
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!("{} {} logged out", user.role, user.id);
        }
    }

    /// The signed-in user, provided they hold `role`.
    pub fn require_role(&self, role: Role) -> ClinicResult<&SessionUser> {
        match &self.user {
            Some(user) if user.role == role => Ok(user),
            Some(user) => Err(ClinicError::PermissionDenied(format!("{} access required, signed in as {}", role, user.role))),
            None => Err(ClinicError::PermissionDenied(format!("{} login required", role))),
        }
    }
}
