//! Clinic directory models.

use serde::{Deserialize, Serialize};

/// A clinic the current user can book at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Clinic {
    /// Backend clinic ID
    pub id: i64,
    /// Display name
    pub name: String,
}

impl Clinic {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A medical specialty registered at one clinic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Specialty {
    /// Backend specialty ID (scoped to a clinic)
    pub id: i64,
    /// Display name (e.g., "Cardiología")
    pub name: String,
}

impl Specialty {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// One row of the doctors-by-specialty listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSpecialtyEntry {
    /// Doctor identifier (user ID in the identity provider)
    pub doctor_id: String,
    /// Specialty the doctor practices at this clinic
    pub specialty_name: String,
}

impl DoctorSpecialtyEntry {
    pub fn new(doctor_id: impl Into<String>, specialty_name: impl Into<String>) -> Self {
        Self {
            doctor_id: doctor_id.into(),
            specialty_name: specialty_name.into(),
        }
    }
}

/// Clinic record returned by the clinic-by-id lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClinicDetails {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}
