use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::slot::time_prefix;

// Default note sent with a booking when the patient leaves the description empty
pub const DEFAULT_DESCRIPTION: &str = "Online appointment booked.";

/// Lifecycle state of an appointment record.
///
/// The record service has used both English and Turkish status codes, so both
/// spellings are accepted. Unrecognised codes are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    Active,
    Cancelled,
    Completed,
    Unknown(String),
}

impl AppointmentStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Active)
    }

    pub fn as_str(&self) -> &str {
        match self {
            AppointmentStatus::Active => "ACTIVE",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Unknown(code) => code,
        }
    }
}

impl From<String> for AppointmentStatus {
    fn from(code: String) -> Self {
        match code.trim().to_uppercase().as_str() {
            "ACTIVE" | "AKTIF" => AppointmentStatus::Active,
            "CANCELLED" | "CANCELED" | "IPTAL" => AppointmentStatus::Cancelled,
            "COMPLETED" | "TAMAMLANDI" => AppointmentStatus::Completed,
            _ => AppointmentStatus::Unknown(code),
        }
    }
}

impl From<AppointmentStatus> for String {
    fn from(status: AppointmentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Clinic reference as embedded in appointment records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
}

impl ClinicRef {
    /// Two references name the same clinic when both carry ids and the ids
    /// agree; otherwise the (non-empty) names must agree.
    pub fn same_clinic(&self, other: &ClinicRef) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => !self.name.is_empty() && self.name == other.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub date: NaiveDate,
    pub time: String,
    pub clinic: ClinicRef,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Appointment {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Same calendar day and same `HH:MM`, regardless of clinic or doctor.
    pub fn occupies(&self, date: NaiveDate, time: &str) -> bool {
        self.date == date && time_prefix(&self.time) == time_prefix(time)
    }
}

/// A booking assembled right before submission.
///
/// Ids are optional because the selection may still be incomplete; the
/// conflict resolver reports that instead of the type system refusing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub clinic: ClinicRef,
    pub doctor_id: Option<i64>,
    pub patient_id: Option<i64>,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl BookingRequest {
    pub fn description_or_default(&self) -> &str {
        match self.description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => DEFAULT_DESCRIPTION,
        }
    }
}

// Body of the evaluate and create endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BookingSubmission {
    pub clinic_id: i64,
    #[serde(default)]
    pub doctor_id: Option<i64>,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub confirm_replace: bool,
}

impl BookingSubmission {
    pub fn into_request(self, clinic: ClinicRef, patient_id: i64) -> BookingRequest {
        BookingRequest {
            clinic,
            doctor_id: self.doctor_id,
            patient_id: Some(patient_id),
            date: self.date,
            time: self.time,
            description: self.description,
        }
    }
}

/// Why a booking cannot go ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    IncompleteSelection,
    DuplicateActiveSlot,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::IncompleteSelection => f.write_str("incomplete selection"),
            BlockReason::DuplicateActiveSlot => f.write_str("duplicate active slot"),
        }
    }
}

/// Outcome of checking a booking against the patient's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Verdict {
    Proceed,
    Block { reason: BlockReason },
    /// The patient already holds `existing_id` as an active booking in the
    /// same clinic; it is superseded once the patient confirms.
    ConfirmReplace { existing_id: i64 },
}

// Response structure for the evaluate endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub verdict: Verdict,
    pub message: String,
}

// Response structure for a successful booking
#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
    pub success: bool,
    pub message: String,
    pub superseded_appointment_id: Option<i64>,
}
