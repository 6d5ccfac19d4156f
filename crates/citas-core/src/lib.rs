//! Citas Core Library
//!
//! Appointment history logic for the clinic mobile client.
//!
//! # Architecture
//!
//! ```text
//!   Backend (ClinicBackend trait)
//!        │
//!        ├── appointments_for_patient ──► RawAppointment[]
//!        │                                      │
//!        ├── clinics / specialties /     ┌──────▼──────────────┐
//!        │   doctors_by_specialty ──────►│  SpecialtyResolver  │── SpecialtyCache
//!        │                               └──────┬──────────────┘   (per session)
//!        ├── display_name / clinic ─────────────┤
//!        │                               ┌──────▼──────────────┐
//!        └── cancel_appointment ◄────────│ AppointmentViewModel│──► ResolvedAppointment[]
//!                                        └─────────────────────┘    (newest first)
//! ```
//!
//! # Core Principle
//!
//! **Lookups never break the list.** A failed specialty, doctor or clinic
//! lookup degrades to a fallback label for that row; only the appointment
//! list request and cancellations report errors.
//!
//! # Modules
//!
//! - [`backend`]: Collaborator traits and backend errors
//! - [`models`]: Domain types (Clinic, RawAppointment, ResolvedAppointment, etc.)
//! - [`resolver`]: Doctor → specialty resolution with per-session cache
//! - [`appointments`]: View model for the appointment history screen

pub mod appointments;
pub mod backend;
pub mod models;
pub mod resolver;

// Re-export commonly used types
pub use appointments::{
    AppointmentError, AppointmentResult, AppointmentSummary, AppointmentViewModel, ViewHandle,
};
pub use backend::{
    BackendError, BackendResult, ClinicBackend, CredentialProvider, SpecialtyDirectory,
    StaticCredentials,
};
pub use models::{
    AppointmentStatus, Clinic, ClinicDetails, DoctorSpecialtyEntry, RawAppointment,
    ResolvedAppointment, Specialty,
};
pub use resolver::{SpecialtyCache, SpecialtyResolver, FALLBACK_SPECIALTY};
