use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::models::appointment::BlockReason;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    InvalidVar {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("invalid scheduler config: {0}")]
    InvalidSchedule(String),
}

/// Failures talking to the clinic record service.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request to record service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("record service returned {status} for {path}")]
    Status { status: u16, path: String },

    #[error("{0} not found in record service")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("incomplete selection")]
    IncompleteSelection,

    #[error("duplicate active slot")]
    DuplicateActiveSlot,

    #[error("an active appointment ({existing_id}) exists in this clinic; confirm to replace it")]
    RequiresConfirmation { existing_id: i64 },

    #[error("appointments cannot be booked on weekends ({0})")]
    WeekendDate(NaiveDate),

    #[error("date {0} is in the past")]
    PastDate(NaiveDate),

    #[error("slot {time} on {date} is not available")]
    SlotUnavailable { date: NaiveDate, time: String },

    #[error("clinic {0} not found or inactive")]
    UnknownClinic(i64),

    #[error("not signed in")]
    Unauthenticated,

    #[error("cannot {event} while {from}")]
    InvalidTransition {
        from: &'static str,
        event: &'static str,
    },

    #[error("remote failure: {0}")]
    Remote(#[from] RemoteError),
}

impl From<BlockReason> for BookingError {
    fn from(reason: BlockReason) -> Self {
        match reason {
            BlockReason::IncompleteSelection => BookingError::IncompleteSelection,
            BlockReason::DuplicateActiveSlot => BookingError::DuplicateActiveSlot,
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = match &self {
            BookingError::IncompleteSelection => StatusCode::UNPROCESSABLE_ENTITY,
            BookingError::DuplicateActiveSlot => StatusCode::CONFLICT,
            BookingError::RequiresConfirmation { .. } => StatusCode::CONFLICT,
            BookingError::WeekendDate(_) | BookingError::PastDate(_) => StatusCode::BAD_REQUEST,
            BookingError::SlotUnavailable { .. } => StatusCode::CONFLICT,
            BookingError::UnknownClinic(_) => StatusCode::NOT_FOUND,
            BookingError::Unauthenticated => StatusCode::UNAUTHORIZED,
            BookingError::InvalidTransition { .. } => StatusCode::CONFLICT,
            BookingError::Remote(RemoteError::NotFound(_)) => StatusCode::NOT_FOUND,
            BookingError::Remote(_) => StatusCode::BAD_GATEWAY,
        };

        let body = match &self {
            BookingError::Remote(err) => {
                // Transport details stay in the logs
                error!("Remote failure: {}", err);
                json!({ "error": "The appointment service could not be reached. Please try again." })
            }
            BookingError::RequiresConfirmation { existing_id } => {
                warn!("Booking needs confirmation: {}", self);
                json!({
                    "error": self.to_string(),
                    "requires_confirmation": true,
                    "existing_appointment_id": existing_id,
                })
            }
            _ => {
                warn!("Booking rejected ({}): {}", status, self);
                json!({ "error": self.to_string() })
            }
        };

        (status, Json(body)).into_response()
    }
}
