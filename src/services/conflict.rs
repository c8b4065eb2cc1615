use tracing::debug;

use crate::models::appointment::{Appointment, BlockReason, BookingRequest, Verdict};

/// Patient, doctor and time must all be chosen before anything else is checked.
pub fn is_complete(request: &BookingRequest) -> bool {
    request.patient_id.is_some() && request.doctor_id.is_some() && !request.time.trim().is_empty()
}

/// Decide whether `request` may be submitted given the patient's bookings.
///
/// Checks run in a fixed order:
/// 1. incomplete selection blocks,
/// 2. an active booking at the same date and `HH:MM` blocks, in any clinic,
/// 3. an active booking in the same clinic asks for confirmation to replace it,
/// 4. otherwise the booking proceeds.
pub fn evaluate(request: &BookingRequest, patient_appointments: &[Appointment]) -> Verdict {
    if !is_complete(request) {
        return Verdict::Block {
            reason: BlockReason::IncompleteSelection,
        };
    }

    if let Some(existing) = patient_appointments
        .iter()
        .find(|appt| appt.is_active() && appt.occupies(request.date, &request.time))
    {
        debug!(
            "Appointment {} already holds {} {}",
            existing.id, request.date, request.time
        );
        return Verdict::Block {
            reason: BlockReason::DuplicateActiveSlot,
        };
    }

    if let Some(existing) = patient_appointments
        .iter()
        .find(|appt| appt.is_active() && appt.clinic.same_clinic(&request.clinic))
    {
        debug!(
            "Appointment {} is active in clinic {:?}",
            existing.id, request.clinic.name
        );
        return Verdict::ConfirmReplace {
            existing_id: existing.id,
        };
    }

    Verdict::Proceed
}
