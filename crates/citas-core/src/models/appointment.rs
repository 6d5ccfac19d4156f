//! Appointment models: raw backend records and display-ready projections.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Backend state code for a canceled appointment. Every other code is active.
pub const CANCELED_STATE_CODE: i64 = 2;

/// Backend state code the API assigns to newly booked appointments.
pub const ACTIVE_STATE_CODE: i64 = 1;

/// Appointment as received from the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawAppointment {
    /// Backend appointment ID
    pub id: i64,
    /// Doctor identifier
    pub doctor_id: String,
    /// Clinic where the appointment takes place
    pub clinic_id: i64,
    /// Calendar date, "YYYY-MM-DD"
    #[serde(default)]
    pub date: Option<String>,
    /// Start time, "HH:MM" (seconds tolerated)
    #[serde(default, alias = "time")]
    pub start_time: Option<String>,
    /// Free-text notes entered when booking
    #[serde(default)]
    pub observations: Option<String>,
    /// State code (see [`CANCELED_STATE_CODE`])
    pub state: i64,
}

impl RawAppointment {
    /// Whether the backend reports this appointment as canceled.
    pub fn is_canceled(&self) -> bool {
        self.state == CANCELED_STATE_CODE
    }

    /// Display string "YYYY-MM-DD HH:MM"; absent fields become empty segments.
    pub fn date_time_label(&self) -> String {
        format!(
            "{} {}",
            self.date.as_deref().unwrap_or(""),
            self.start_time.as_deref().unwrap_or("")
        )
    }

    /// Structured start instant, if the date can be parsed.
    pub fn scheduled_at(&self) -> Option<NaiveDateTime> {
        parse_schedule(self.date.as_deref(), self.start_time.as_deref())
    }
}

/// Parse a date and optional start time into a local instant.
///
/// A missing or malformed time means start of day. A missing or malformed
/// date yields `None`; such entries sort after every dated appointment.
pub fn parse_schedule(date: Option<&str>, time: Option<&str>) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date?.trim(), "%Y-%m-%d").ok()?;
    let time = time
        .map(str::trim)
        .and_then(|t| {
            NaiveTime::parse_from_str(t, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
                .ok()
        })
        .or_else(|| NaiveTime::from_hms_opt(0, 0, 0))?;
    Some(date.and_time(time))
}

/// Client-observed lifecycle of one appointment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    /// Not canceled, start time still ahead
    Pending,
    /// Not canceled, start time already passed
    Finished,
    /// Canceled (terminal)
    Canceled,
}

/// An appointment with names resolved, ready for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAppointment {
    pub id: i64,
    /// Display string, "YYYY-MM-DD HH:MM"
    pub date_time: String,
    /// Structured start instant used for ordering and status
    pub scheduled_at: Option<NaiveDateTime>,
    pub specialty_name: String,
    pub doctor_name: String,
    pub clinic_name: String,
    pub canceled: bool,
    pub observations: String,
}

impl ResolvedAppointment {
    /// Derive the status at `now`. Recomputed on every call; nothing is stored.
    pub fn status_at(&self, now: NaiveDateTime) -> AppointmentStatus {
        if self.canceled {
            return AppointmentStatus::Canceled;
        }
        match self.scheduled_at {
            Some(at) if at > now => AppointmentStatus::Pending,
            _ => AppointmentStatus::Finished,
        }
    }

    /// Only pending appointments may be canceled from the UI.
    pub fn is_cancelable_at(&self, now: NaiveDateTime) -> bool {
        self.status_at(now) == AppointmentStatus::Pending
    }
}

/// Ordering for the history list: most recent first, undated last.
///
/// Ties on the instant fall back to the display string (descending) so the
/// order agrees with a lexicographic sort of well-formed labels.
pub fn newest_first(a: &ResolvedAppointment, b: &ResolvedAppointment) -> Ordering {
    match (a.scheduled_at, b.scheduled_at) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| b.date_time.cmp(&a.date_time)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
