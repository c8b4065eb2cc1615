use axum::{
    extract::{Json as ExtractJson, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use tracing::{info, warn};

use crate::client::{list_active_clinics, AppointmentBackend};
use crate::config::SchedulerConfig;
use crate::error::{BookingError, RemoteError};
use crate::models::appointment::{
    Appointment, BookingResponse, BookingSubmission, ClinicRef, EvaluateResponse, Verdict,
};
use crate::models::common::{DateQuery, USER_EMAIL_HEADER};
use crate::models::directory::{Clinic, Doctor, Patient};
use crate::models::slot::SlotGridResponse;
use crate::services::booking::{evaluate_booking, load_slot_grid, resolve_clinic, submit_booking};

/// Source of the current wall-clock time.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| Local::now().naive_local())
}

// AppState struct containing shared resources
pub struct AppState {
    pub backend: Arc<dyn AppointmentBackend>,
    pub scheduler: SchedulerConfig,
    pub clock: Clock,
}

impl AppState {
    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }
}

// Resolve the patient named by the gateway-provided email header
async fn current_patient(state: &AppState, headers: &HeaderMap) -> Result<Patient, BookingError> {
    let email = headers
        .get(USER_EMAIL_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .ok_or(BookingError::Unauthenticated)?;

    match state.backend.find_patient_by_email(email).await {
        Ok(patient) => Ok(patient),
        Err(RemoteError::NotFound(_)) => {
            warn!("No patient registered for the supplied email");
            Err(BookingError::Unauthenticated)
        }
        Err(err) => Err(err.into()),
    }
}

fn verdict_message(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Proceed => "Slot can be booked".to_string(),
        Verdict::Block { reason } => reason.to_string(),
        Verdict::ConfirmReplace { .. } => {
            "You already have an active appointment in this clinic. Booking a new one cancels it."
                .to_string()
        }
    }
}

// List active clinics endpoint
pub async fn list_clinics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Clinic>>, BookingError> {
    let clinics = list_active_clinics(state.backend.as_ref()).await?;
    info!("Returning {} active clinics", clinics.len());
    Ok(Json(clinics))
}

// List doctors of a clinic endpoint
pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
    Path(clinic_id): Path<i64>,
) -> Result<Json<Vec<Doctor>>, BookingError> {
    let doctors = state.backend.list_doctors(clinic_id).await?;
    info!("Clinic {} has {} doctors", clinic_id, doctors.len());
    Ok(Json(doctors))
}

// Slot grid of a doctor for one day
pub async fn slot_grid(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<i64>,
    Query(query): Query<DateQuery>,
) -> Result<Json<SlotGridResponse>, BookingError> {
    info!(
        "Received request for slots of doctor {} on {}",
        doctor_id, query.date
    );
    let grid = load_slot_grid(
        state.backend.as_ref(),
        doctor_id,
        query.date,
        state.now(),
        &state.scheduler,
    )
    .await?;
    Ok(Json(grid))
}

// Dry-run the conflict checks for the current patient
pub async fn evaluate_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ExtractJson(submission): ExtractJson<BookingSubmission>,
) -> Result<Json<EvaluateResponse>, BookingError> {
    let patient = current_patient(&state, &headers).await?;
    let clinic = resolve_clinic(state.backend.as_ref(), submission.clinic_id).await?;

    let request = submission.into_request(
        ClinicRef {
            id: Some(clinic.id),
            name: clinic.name,
        },
        patient.id,
    );
    let verdict = evaluate_booking(state.backend.as_ref(), &request).await?;
    info!("Evaluated booking for patient {}: {:?}", patient.id, verdict);

    Ok(Json(EvaluateResponse {
        message: verdict_message(&verdict),
        verdict,
    }))
}

// Create appointment endpoint
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ExtractJson(submission): ExtractJson<BookingSubmission>,
) -> Result<(StatusCode, Json<BookingResponse>), BookingError> {
    let patient = current_patient(&state, &headers).await?;
    let clinic = resolve_clinic(state.backend.as_ref(), submission.clinic_id).await?;
    info!(
        "Received booking from patient {} for clinic {} ({})",
        patient.id, clinic.name, clinic.id
    );

    let confirm_replace = submission.confirm_replace;
    let request = submission.into_request(
        ClinicRef {
            id: Some(clinic.id),
            name: clinic.name,
        },
        patient.id,
    );

    let outcome = submit_booking(
        state.backend.as_ref(),
        &request,
        confirm_replace,
        state.now(),
        &state.scheduler,
    )
    .await?;

    let message = match outcome.superseded_id {
        Some(id) => format!("Appointment created; appointment {} was replaced", id),
        None => "Appointment created".to_string(),
    };

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            success: true,
            message,
            superseded_appointment_id: outcome.superseded_id,
        }),
    ))
}

// Current patient's appointments
pub async fn my_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Appointment>>, BookingError> {
    let patient = current_patient(&state, &headers).await?;
    let appointments = state.backend.appointments_by_patient(patient.id).await?;
    Ok(Json(appointments))
}

// Effective scheduler settings, development only
pub async fn scheduler_config(State(state): State<Arc<AppState>>) -> Json<SchedulerConfig> {
    Json(state.scheduler.clone())
}
