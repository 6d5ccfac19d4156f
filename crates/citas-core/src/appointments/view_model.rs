//! Appointment history view model.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::ClinicBackend;
use crate::models::{
    newest_first, AppointmentStatus, Clinic, RawAppointment, ResolvedAppointment,
};
use crate::resolver::SpecialtyResolver;

use super::{
    AppointmentError, AppointmentResult, ViewHandle, FALLBACK_CLINIC, FALLBACK_DOCTOR,
    FALLBACK_OBSERVATIONS,
};

/// Appointment counts per status, for the screen header.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppointmentSummary {
    pub pending: u32,
    pub finished: u32,
    pub canceled: u32,
}

/// Holds the display rows of one appointment history screen.
pub struct AppointmentViewModel<B: ClinicBackend + ?Sized> {
    backend: Arc<B>,
    resolver: SpecialtyResolver,
    appointments: Vec<ResolvedAppointment>,
    notice: Option<String>,
    handle: ViewHandle,
}

impl<B: ClinicBackend + ?Sized> AppointmentViewModel<B> {
    /// Create a view model with a sequential specialty resolver.
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_resolver(backend, SpecialtyResolver::new())
    }

    pub fn with_resolver(backend: Arc<B>, resolver: SpecialtyResolver) -> Self {
        Self {
            backend,
            resolver,
            appointments: Vec::new(),
            notice: None,
            handle: ViewHandle::new(),
        }
    }

    /// Build display rows from a batch of raw appointments.
    ///
    /// Name lookups that fail fall back to placeholder labels for that row
    /// only. The result is sorted newest first. If the view was discarded or
    /// a newer load started meanwhile, the rows are dropped and the current
    /// list is returned unchanged.
    pub async fn load(
        &mut self,
        raw: Vec<RawAppointment>,
        clinics: &[Clinic],
    ) -> &[ResolvedAppointment] {
        let ticket = self.handle.next_ticket();
        self.load_for_ticket(ticket, raw, Some(clinics)).await;
        &self.appointments
    }

    /// Fetch clinics and the patient's appointments, then [`load`](Self::load).
    ///
    /// A failed appointment request clears the list and leaves a notice. A
    /// failed clinic request is not fatal: rows show the fallback specialty
    /// but nothing is cached, so the next refresh probes again.
    pub async fn refresh(&mut self, patient_id: &str) -> AppointmentResult<&[ResolvedAppointment]> {
        let ticket = self.handle.next_ticket();
        let backend = Arc::clone(&self.backend);

        let raw = match backend.appointments_for_patient(patient_id).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to load appointments for patient {}: {}", patient_id, e);
                let err = AppointmentError::LoadFailed(e);
                if self.handle.is_current(ticket) {
                    self.appointments.clear();
                    self.notice = Some(err.user_message().to_string());
                }
                return Err(err);
            }
        };

        let clinics = match backend.clinics().await {
            Ok(clinics) => Some(clinics),
            Err(e) => {
                warn!("Failed to list clinics, specialties will fall back: {}", e);
                None
            }
        };

        self.load_for_ticket(ticket, raw, clinics.as_deref()).await;
        Ok(&self.appointments)
    }

    /// Cancel an appointment.
    ///
    /// The backend call is always made, even for rows already canceled. On
    /// success the row is marked canceled (never removed). On failure
    /// nothing changes and the caller decides whether to retry.
    pub async fn cancel(&mut self, appointment_id: i64) -> AppointmentResult<()> {
        let backend = Arc::clone(&self.backend);
        match backend.cancel_appointment(appointment_id).await {
            Ok(()) => {
                info!("Canceled appointment {}", appointment_id);
                if self.handle.is_discarded() {
                    return Ok(());
                }
                match self.appointments.iter_mut().find(|a| a.id == appointment_id) {
                    Some(appointment) => appointment.canceled = true,
                    None => debug!("Canceled appointment {} is not on screen", appointment_id),
                }
                Ok(())
            }
            Err(e) => {
                warn!("Failed to cancel appointment {}: {}", appointment_id, e);
                Err(AppointmentError::CancelFailed {
                    id: appointment_id,
                    source: e,
                })
            }
        }
    }

    /// Current display rows, newest first.
    pub fn appointments(&self) -> &[ResolvedAppointment] {
        &self.appointments
    }

    pub fn get(&self, appointment_id: i64) -> Option<&ResolvedAppointment> {
        self.appointments.iter().find(|a| a.id == appointment_id)
    }

    /// Status of an appointment at `now`, if it is on screen.
    pub fn status(&self, appointment_id: i64, now: NaiveDateTime) -> Option<AppointmentStatus> {
        self.get(appointment_id).map(|a| a.status_at(now))
    }

    /// Whether the UI should offer cancellation for this appointment.
    pub fn can_cancel(&self, appointment_id: i64, now: NaiveDateTime) -> bool {
        self.get(appointment_id)
            .map(|a| a.is_cancelable_at(now))
            .unwrap_or(false)
    }

    pub fn summary(&self, now: NaiveDateTime) -> AppointmentSummary {
        let mut summary = AppointmentSummary::default();
        for appointment in &self.appointments {
            match appointment.status_at(now) {
                AppointmentStatus::Pending => summary.pending += 1,
                AppointmentStatus::Finished => summary.finished += 1,
                AppointmentStatus::Canceled => summary.canceled += 1,
            }
        }
        summary
    }

    /// User-visible notice left by the last failed load, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Handle for invalidating or discarding this view from elsewhere.
    pub fn handle(&self) -> ViewHandle {
        self.handle.clone()
    }

    /// Mark the screen as unmounted; late responses are ignored from now on.
    pub fn discard(&self) {
        self.handle.discard();
    }

    pub fn resolver(&self) -> &SpecialtyResolver {
        &self.resolver
    }

    /// Start a new screen session: forget resolved specialties and rows.
    pub fn reset_session(&mut self) {
        self.handle.invalidate();
        self.resolver.reset();
        self.appointments.clear();
        self.notice = None;
    }

    /// `clinics` is `None` when the clinic listing itself failed; resolution
    /// is skipped then so no fallback gets cached.
    async fn load_for_ticket(
        &mut self,
        ticket: u64,
        raw: Vec<RawAppointment>,
        clinics: Option<&[Clinic]>,
    ) {
        let backend = Arc::clone(&self.backend);

        let doctor_ids: BTreeSet<&str> = raw.iter().map(|a| a.doctor_id.as_str()).collect();
        let clinic_ids: BTreeSet<i64> = raw.iter().map(|a| a.clinic_id).collect();

        match clinics {
            Some(clinics) => {
                self.resolver
                    .resolve(backend.as_ref(), doctor_ids.iter().copied(), clinics)
                    .await;
            }
            None => debug!("Skipping specialty resolution without a clinic list"),
        }
        let doctor_names = lookup_doctor_names(backend.as_ref(), &doctor_ids).await;
        let clinic_names = lookup_clinic_names(backend.as_ref(), &clinic_ids).await;

        let mut rows: Vec<ResolvedAppointment> = raw
            .iter()
            .map(|a| ResolvedAppointment {
                id: a.id,
                date_time: a.date_time_label(),
                scheduled_at: a.scheduled_at(),
                specialty_name: self.resolver.specialty_for(&a.doctor_id).to_string(),
                doctor_name: doctor_names
                    .get(a.doctor_id.as_str())
                    .cloned()
                    .unwrap_or_else(|| FALLBACK_DOCTOR.to_string()),
                clinic_name: clinic_names
                    .get(&a.clinic_id)
                    .cloned()
                    .unwrap_or_else(|| FALLBACK_CLINIC.to_string()),
                canceled: a.is_canceled(),
                observations: observation_text(a.observations.as_deref()),
            })
            .collect();
        rows.sort_by(newest_first);

        if !self.handle.is_current(ticket) {
            debug!("Dropping {} stale appointment rows", rows.len());
            return;
        }

        info!("Loaded {} appointments", rows.len());
        self.appointments = rows;
        self.notice = None;
    }
}

async fn lookup_doctor_names<B>(backend: &B, doctor_ids: &BTreeSet<&str>) -> HashMap<String, String>
where
    B: ClinicBackend + ?Sized,
{
    let mut names = HashMap::new();
    for &doctor_id in doctor_ids {
        match backend.display_name(doctor_id).await {
            Ok(name) if !name.trim().is_empty() => {
                names.insert(doctor_id.to_string(), name);
            }
            Ok(_) => debug!("Doctor {} has an empty display name", doctor_id),
            Err(e) => warn!("Failed to look up doctor {}: {}", doctor_id, e),
        }
    }
    names
}

async fn lookup_clinic_names<B>(backend: &B, clinic_ids: &BTreeSet<i64>) -> HashMap<i64, String>
where
    B: ClinicBackend + ?Sized,
{
    let mut names = HashMap::new();
    for &clinic_id in clinic_ids {
        match backend.clinic(clinic_id).await {
            Ok(details) if !details.name.trim().is_empty() => {
                names.insert(clinic_id, details.name);
            }
            Ok(_) => debug!("Clinic {} has an empty name", clinic_id),
            Err(e) => warn!("Failed to look up clinic {}: {}", clinic_id, e),
        }
    }
    names
}

fn observation_text(observations: Option<&str>) -> String {
    match observations.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => FALLBACK_OBSERVATIONS.to_string(),
    }
}
