//! Async orchestration around the pure scheduler: fetch what the checks need
//! from the record service, run them, submit.

use chrono::{NaiveDate, NaiveDateTime};
use futures::future::try_join;
use tracing::{debug, info, warn};

use crate::client::{list_active_clinics, AppointmentBackend};
use crate::config::SchedulerConfig;
use crate::error::BookingError;
use crate::models::appointment::{BookingRequest, Verdict};
use crate::models::directory::Clinic;
use crate::models::slot::{SlotGridResponse, TimeSlot};
use crate::services::conflict::{evaluate, is_complete};
use crate::services::time_slots::{annotate_grid, compute_disabled_slots, generate_slots, is_weekend};

// Result of a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingOutcome {
    pub superseded_id: Option<i64>,
}

/// Look up a clinic that is open for booking.
pub async fn resolve_clinic(
    backend: &dyn AppointmentBackend,
    clinic_id: i64,
) -> Result<Clinic, BookingError> {
    list_active_clinics(backend)
        .await?
        .into_iter()
        .find(|clinic| clinic.id == clinic_id)
        .ok_or(BookingError::UnknownClinic(clinic_id))
}

/// Annotated slot grid of a doctor for one day. Days before `now` are refused.
pub async fn load_slot_grid(
    backend: &dyn AppointmentBackend,
    doctor_id: i64,
    date: NaiveDate,
    now: NaiveDateTime,
    config: &SchedulerConfig,
) -> Result<SlotGridResponse, BookingError> {
    if date < now.date() {
        return Err(BookingError::PastDate(date));
    }

    let grid = generate_slots(date, config);

    // Weekends have nothing to annotate
    let doctor_appointments = if grid.is_empty() {
        Vec::new()
    } else {
        backend.appointments_by_doctor(doctor_id, date).await?
    };

    debug!(
        "Doctor {} has {} appointments on {}",
        doctor_id,
        doctor_appointments.len(),
        date
    );

    Ok(SlotGridResponse {
        doctor_id,
        date,
        weekend: is_weekend(date),
        groups: annotate_grid(&grid, date, now, &doctor_appointments),
    })
}

/// Run the conflict checks for `request` against the patient's bookings.
pub async fn evaluate_booking(
    backend: &dyn AppointmentBackend,
    request: &BookingRequest,
) -> Result<Verdict, BookingError> {
    let patient_appointments = match request.patient_id {
        Some(patient_id) if is_complete(request) => {
            backend.appointments_by_patient(patient_id).await?
        }
        _ => Vec::new(),
    };
    Ok(evaluate(request, &patient_appointments))
}

/// Validate and submit a booking.
///
/// A same-clinic replacement only goes through with `confirm_replace` set.
/// The slot is re-checked against the doctor's current bookings because the
/// grid the patient picked from may be stale.
pub async fn submit_booking(
    backend: &dyn AppointmentBackend,
    request: &BookingRequest,
    confirm_replace: bool,
    now: NaiveDateTime,
    config: &SchedulerConfig,
) -> Result<BookingOutcome, BookingError> {
    if is_weekend(request.date) {
        return Err(BookingError::WeekendDate(request.date));
    }
    if request.date < now.date() {
        return Err(BookingError::PastDate(request.date));
    }

    let (Some(patient_id), Some(doctor_id)) = (request.patient_id, request.doctor_id) else {
        return Err(BookingError::IncompleteSelection);
    };
    if !is_complete(request) {
        return Err(BookingError::IncompleteSelection);
    }

    let (patient_appointments, doctor_appointments) = try_join(
        backend.appointments_by_patient(patient_id),
        backend.appointments_by_doctor(doctor_id, request.date),
    )
    .await?;

    let superseded_id = match evaluate(request, &patient_appointments) {
        Verdict::Block { reason } => {
            warn!("Booking blocked for patient {}: {}", patient_id, reason);
            return Err(reason.into());
        }
        Verdict::ConfirmReplace { existing_id } if !confirm_replace => {
            return Err(BookingError::RequiresConfirmation { existing_id });
        }
        Verdict::ConfirmReplace { existing_id } => Some(existing_id),
        Verdict::Proceed => None,
    };

    let unavailable = || BookingError::SlotUnavailable {
        date: request.date,
        time: request.time.clone(),
    };
    let slot: TimeSlot = request.time.parse().map_err(|_| unavailable())?;
    let grid = generate_slots(request.date, config);
    let on_grid = grid.iter().any(|group| group.slots.contains(&slot));
    let disabled = compute_disabled_slots(&grid, request.date, now, &doctor_appointments);
    if !on_grid || disabled.contains(&slot) {
        return Err(unavailable());
    }

    backend.create_appointment(request).await?;

    info!(
        "Booked {} {} with doctor {} for patient {}",
        request.date, slot, doctor_id, patient_id
    );
    if let Some(id) = superseded_id {
        info!("Appointment {} superseded by the new booking", id);
    }

    Ok(BookingOutcome { superseded_id })
}
