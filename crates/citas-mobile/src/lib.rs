//! Citas mobile bindings.
//!
//! Wires the core appointment logic to the real backend and exports it to
//! the iOS/Android apps through UniFFI.
//!
//! # Modules
//!
//! - [`config`]: Client configuration (URL, timeouts, resolver concurrency)
//! - [`credentials`]: Bearer token for the signed-in user
//! - [`http`]: reqwest implementation of the backend traits
//! - [`logging`]: tracing subscriber setup

pub mod config;
pub mod credentials;
pub mod http;
pub mod logging;

pub use config::{ClientConfig, ConfigError};
pub use credentials::SessionCredentials;
pub use http::HttpBackend;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::Arc;

use chrono::NaiveDateTime;
use citas_core::{
    AppointmentError, AppointmentStatus, AppointmentSummary, AppointmentViewModel,
    ResolvedAppointment, SpecialtyResolver, ViewHandle,
};
use tokio::runtime::Runtime;
use tokio::sync::Mutex;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum CitasError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    LoadError(String),

    #[error("{0}")]
    CancelError(String),

    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

impl From<ConfigError> for CitasError {
    fn from(e: ConfigError) -> Self {
        CitasError::ConfigError(e.to_string())
    }
}

impl From<AppointmentError> for CitasError {
    fn from(e: AppointmentError) -> Self {
        tracing::warn!("{}", e);
        match e {
            AppointmentError::LoadFailed(_) => CitasError::LoadError(e.user_message().to_string()),
            AppointmentError::CancelFailed { .. } => {
                CitasError::CancelError(e.user_message().to_string())
            }
        }
    }
}

impl From<std::io::Error> for CitasError {
    fn from(e: std::io::Error) -> Self {
        CitasError::RuntimeError(e.to_string())
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open a client for the given backend.
#[uniffi::export]
pub fn open_client(config: FfiConfig) -> Result<Arc<CitasCore>, CitasError> {
    let config: ClientConfig = config.into();
    CitasCore::open(config).map(Arc::new)
}

/// Open a client configured from `CITAS_*` environment variables.
#[uniffi::export]
pub fn open_client_from_env() -> Result<Arc<CitasCore>, CitasError> {
    let config = ClientConfig::from_env()?;
    CitasCore::open(config).map(Arc::new)
}

// =========================================================================
// Main API Object
// =========================================================================

/// One appointment history screen backed by the HTTP backend.
///
/// Calls block the calling (background) thread on an internal runtime.
#[derive(uniffi::Object)]
pub struct CitasCore {
    runtime: Runtime,
    credentials: Arc<SessionCredentials>,
    view_model: Mutex<AppointmentViewModel<HttpBackend>>,
    handle: ViewHandle,
}

impl CitasCore {
    fn open(config: ClientConfig) -> Result<Self, CitasError> {
        logging::init();

        let credentials = Arc::new(SessionCredentials::new());
        let backend = HttpBackend::new(&config, credentials.clone())?;
        let resolver = SpecialtyResolver::new().with_concurrency(config.resolve_concurrency);
        let view_model = AppointmentViewModel::with_resolver(Arc::new(backend), resolver);
        let handle = view_model.handle();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        Ok(Self {
            runtime,
            credentials,
            view_model: Mutex::new(view_model),
            handle,
        })
    }
}

#[uniffi::export]
impl CitasCore {
    // =========================================================================
    // Session
    // =========================================================================

    /// Store the identity provider token for subsequent calls.
    pub fn set_access_token(&self, token: String) {
        self.runtime.block_on(self.credentials.set(token));
    }

    /// Forget the token (sign out).
    pub fn clear_access_token(&self) {
        self.runtime.block_on(self.credentials.clear());
    }

    /// Mark the screen as closed. Responses still in flight are dropped.
    pub fn discard(&self) {
        self.handle.discard();
    }

    // =========================================================================
    // Appointment Operations
    // =========================================================================

    /// Reload the patient's appointment history.
    pub fn refresh(&self, patient_id: String) -> Result<Vec<FfiAppointment>, CitasError> {
        self.runtime.block_on(async {
            let mut vm = self.view_model.lock().await;
            let now = local_now();
            let rows = vm.refresh(&patient_id).await?;
            Ok(rows.iter().map(|a| FfiAppointment::new(a, now)).collect())
        })
    }

    /// Current rows without hitting the backend.
    pub fn appointments(&self) -> Vec<FfiAppointment> {
        self.runtime.block_on(async {
            let vm = self.view_model.lock().await;
            let now = local_now();
            vm.appointments()
                .iter()
                .map(|a| FfiAppointment::new(a, now))
                .collect()
        })
    }

    /// Cancel an appointment. On failure nothing changes; retry is up to the user.
    pub fn cancel(&self, appointment_id: i64) -> Result<(), CitasError> {
        self.runtime.block_on(async {
            let mut vm = self.view_model.lock().await;
            vm.cancel(appointment_id).await?;
            Ok(())
        })
    }

    pub fn status(&self, appointment_id: i64) -> Option<FfiAppointmentStatus> {
        self.runtime.block_on(async {
            let vm = self.view_model.lock().await;
            vm.status(appointment_id, local_now()).map(Into::into)
        })
    }

    pub fn can_cancel(&self, appointment_id: i64) -> bool {
        self.runtime.block_on(async {
            let vm = self.view_model.lock().await;
            vm.can_cancel(appointment_id, local_now())
        })
    }

    pub fn summary(&self) -> FfiAppointmentSummary {
        self.runtime.block_on(async {
            let vm = self.view_model.lock().await;
            vm.summary(local_now()).into()
        })
    }

    /// Notice left by the last failed refresh.
    pub fn notice(&self) -> Option<String> {
        self.runtime.block_on(async {
            let vm = self.view_model.lock().await;
            vm.notice().map(str::to_string)
        })
    }
}

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe client configuration.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub resolve_concurrency: u32,
}

impl From<FfiConfig> for ClientConfig {
    fn from(config: FfiConfig) -> Self {
        ClientConfig {
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            request_timeout_secs: config.request_timeout_secs,
            connect_timeout_secs: config.connect_timeout_secs,
            resolve_concurrency: config.resolve_concurrency as usize,
        }
    }
}

/// FFI-safe appointment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiAppointmentStatus {
    Pending,
    Finished,
    Canceled,
}

impl From<AppointmentStatus> for FfiAppointmentStatus {
    fn from(status: AppointmentStatus) -> Self {
        match status {
            AppointmentStatus::Pending => FfiAppointmentStatus::Pending,
            AppointmentStatus::Finished => FfiAppointmentStatus::Finished,
            AppointmentStatus::Canceled => FfiAppointmentStatus::Canceled,
        }
    }
}

/// FFI-safe appointment row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointment {
    pub id: i64,
    pub date_time: String,
    pub specialty_name: String,
    pub doctor_name: String,
    pub clinic_name: String,
    pub canceled: bool,
    pub observations: String,
    pub status: FfiAppointmentStatus,
}

impl FfiAppointment {
    fn new(appointment: &ResolvedAppointment, now: NaiveDateTime) -> Self {
        Self {
            id: appointment.id,
            date_time: appointment.date_time.clone(),
            specialty_name: appointment.specialty_name.clone(),
            doctor_name: appointment.doctor_name.clone(),
            clinic_name: appointment.clinic_name.clone(),
            canceled: appointment.canceled,
            observations: appointment.observations.clone(),
            status: appointment.status_at(now).into(),
        }
    }
}

/// FFI-safe status counts.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointmentSummary {
    pub pending: u32,
    pub finished: u32,
    pub canceled: u32,
}

impl From<AppointmentSummary> for FfiAppointmentSummary {
    fn from(summary: AppointmentSummary) -> Self {
        Self {
            pending: summary.pending,
            finished: summary.finished,
            canceled: summary.canceled,
        }
    }
}
