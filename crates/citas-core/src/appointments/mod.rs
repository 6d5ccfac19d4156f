//! Appointment history: reconciliation of backend records into display rows.
//!
//! Pipeline: Raw appointments → Specialty resolution → Name lookup → Sort

mod handle;
mod view_model;

pub use handle::*;
pub use view_model::*;

use thiserror::Error;

use crate::backend::BackendError;

/// Shown when the doctor's name cannot be looked up.
pub const FALLBACK_DOCTOR: &str = "Sin doctor";

/// Shown when the clinic cannot be looked up.
pub const FALLBACK_CLINIC: &str = "Sin clínica";

/// Shown when the appointment carries no notes.
pub const FALLBACK_OBSERVATIONS: &str = "Sin observaciones";

/// Errors that reach the presentation layer.
///
/// Individual lookups never fail a batch; only the appointment list request
/// and cancellation requests surface here.
#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Failed to load appointments: {0}")]
    LoadFailed(#[source] BackendError),

    #[error("Failed to cancel appointment {id}: {source}")]
    CancelFailed {
        id: i64,
        #[source]
        source: BackendError,
    },
}

impl AppointmentError {
    /// Notice suitable for showing to the patient.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppointmentError::LoadFailed(_) => {
                "No se pudieron cargar tus citas. Intenta nuevamente más tarde."
            }
            AppointmentError::CancelFailed { .. } => {
                "No se pudo cancelar la cita. Intenta nuevamente."
            }
        }
    }
}

pub type AppointmentResult<T> = Result<T, AppointmentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_hide_transport_details() {
        let err = AppointmentError::CancelFailed {
            id: 42,
            source: BackendError::Transport("connection reset".into()),
        };
        assert!(!err.user_message().contains("connection"));
        assert!(err.to_string().contains("42"));
    }
}
