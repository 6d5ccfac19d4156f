//! Collaborator interfaces for the clinic backend.
//!
//! The core never talks to the network directly. Everything it needs from
//! the backend goes through these traits, so resolution and reconciliation
//! can run against fakes in tests and against the HTTP client in the app.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Clinic, ClinicDetails, DoctorSpecialtyEntry, RawAppointment, Specialty};

/// Backend call errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Not authenticated")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unexpected status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Credential error: {0}")]
    Credentials(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Clinic-scoped specialty listings: the only queries available for
/// working out which specialty a doctor practices.
#[async_trait]
pub trait SpecialtyDirectory: Send + Sync {
    /// Specialties registered at a clinic, in backend order.
    async fn specialties(&self, clinic_id: i64) -> BackendResult<Vec<Specialty>>;

    /// Doctors practicing a specialty at a clinic.
    async fn doctors_by_specialty(
        &self,
        clinic_id: i64,
        specialty_id: i64,
    ) -> BackendResult<Vec<DoctorSpecialtyEntry>>;
}

/// Everything the appointment history screen needs from the backend.
#[async_trait]
pub trait ClinicBackend: SpecialtyDirectory {
    /// Clinics visible to the current user.
    async fn clinics(&self) -> BackendResult<Vec<Clinic>>;

    /// Display name for a user (doctor, patient, staff).
    async fn display_name(&self, user_id: &str) -> BackendResult<String>;

    /// Clinic by ID.
    async fn clinic(&self, clinic_id: i64) -> BackendResult<ClinicDetails>;

    /// All appointments booked by a patient, in no particular order.
    async fn appointments_for_patient(&self, patient_id: &str) -> BackendResult<Vec<RawAppointment>>;

    /// Ask the backend to cancel an appointment.
    async fn cancel_appointment(&self, appointment_id: i64) -> BackendResult<()>;
}

/// Source of the bearer credential attached to backend calls.
///
/// Passed explicitly to whatever makes authenticated requests instead of
/// being read from a process-wide identity-provider session.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn bearer_token(&self) -> BackendResult<String>;
}

/// Fixed token, for tests and for hosts that refresh tokens themselves.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    token: String,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn bearer_token(&self) -> BackendResult<String> {
        if self.token.is_empty() {
            return Err(BackendError::Credentials("empty token".into()));
        }
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_credentials() {
        let creds = StaticCredentials::new("abc");
        assert_eq!(creds.bearer_token().await.unwrap(), "abc");

        let empty = StaticCredentials::new("");
        assert!(matches!(
            empty.bearer_token().await,
            Err(BackendError::Credentials(_))
        ));
    }

    #[test]
    fn test_error_display() {
        let err = BackendError::Status {
            code: 500,
            body: "boom".into(),
        };
        assert_eq!(err.to_string(), "Unexpected status 500: boom");
    }
}
