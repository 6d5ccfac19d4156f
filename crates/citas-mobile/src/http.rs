//! HTTP implementation of the clinic backend.

use std::sync::Arc;

use async_trait::async_trait;
use citas_core::{
    BackendError, BackendResult, Clinic, ClinicBackend, ClinicDetails, CredentialProvider,
    DoctorSpecialtyEntry, RawAppointment, SpecialtyDirectory, Specialty,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::config::{ClientConfig, ConfigError, ConfigResult};

/// User profile returned by `GET /users/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserProfile {
    display_name: String,
}

/// REST client for the clinic backend.
pub struct HttpBackend {
    http_client: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl HttpBackend {
    /// Create a backend client from a validated config.
    pub fn new(config: &ClientConfig, credentials: Arc<dyn CredentialProvider>) -> ConfigResult<Self> {
        config.validate()?;
        let base_url = config.base_url()?;
        info!("Creating HttpBackend with base_url: {}", base_url);

        let http_client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            credentials,
        })
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> BackendResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::Transport(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> BackendResult<T> {
        let url = self.endpoint(segments)?;
        let token = self.credentials.bearer_token().await?;
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(url.clone())
            .bearer_auth(&token)
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_status(response, &url).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(format!("{}: {}", url.path(), e)))
    }
}

#[async_trait]
impl SpecialtyDirectory for HttpBackend {
    async fn specialties(&self, clinic_id: i64) -> BackendResult<Vec<Specialty>> {
        let clinic = clinic_id.to_string();
        self.get_json(&["clinics", &clinic, "specialties"]).await
    }

    async fn doctors_by_specialty(
        &self,
        clinic_id: i64,
        specialty_id: i64,
    ) -> BackendResult<Vec<DoctorSpecialtyEntry>> {
        let clinic = clinic_id.to_string();
        let specialty = specialty_id.to_string();
        self.get_json(&["clinics", &clinic, "specialties", &specialty, "doctors"])
            .await
    }
}

#[async_trait]
impl ClinicBackend for HttpBackend {
    async fn clinics(&self) -> BackendResult<Vec<Clinic>> {
        self.get_json(&["clinics"]).await
    }

    async fn display_name(&self, user_id: &str) -> BackendResult<String> {
        let profile: UserProfile = self.get_json(&["users", user_id]).await?;
        Ok(profile.display_name)
    }

    async fn clinic(&self, clinic_id: i64) -> BackendResult<ClinicDetails> {
        let clinic = clinic_id.to_string();
        self.get_json(&["clinics", &clinic]).await
    }

    async fn appointments_for_patient(&self, patient_id: &str) -> BackendResult<Vec<RawAppointment>> {
        self.get_json(&["patients", patient_id, "appointments"]).await
    }

    async fn cancel_appointment(&self, appointment_id: i64) -> BackendResult<()> {
        let id = appointment_id.to_string();
        let url = self.endpoint(&["appointments", &id, "cancel"])?;
        let token = self.credentials.bearer_token().await?;
        debug!("PUT {}", url);

        let response = self
            .http_client
            .put(url.clone())
            .bearer_auth(&token)
            .send()
            .await
            .map_err(transport_error)?;

        check_status(response, &url).await?;
        Ok(())
    }
}

fn transport_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Transport(format!("request timed out: {}", e))
    } else {
        BackendError::Transport(e.to_string())
    }
}

/// Pass successful responses through; turn everything else into an error.
async fn check_status(response: reqwest::Response, url: &Url) -> BackendResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, body, url))
}

fn status_error(status: StatusCode, body: String, url: &Url) -> BackendError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Unauthorized,
        StatusCode::NOT_FOUND => BackendError::NotFound(url.path().to_string()),
        _ => BackendError::Status {
            code: status.as_u16(),
            body,
        },
    }
}
