//! Serializable view state for the booking screen and the phase machine that
//! drives when the conflict checks run.
//!
//! ```text
//! Idle -> SlotChosen -> Evaluating -> Blocked | AwaitingConfirmation | Submitting
//! AwaitingConfirmation -> Submitting (confirm) | Idle (cancel)
//! Submitting -> Submitted | Failed
//! Failed -> SlotChosen (retry)
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SchedulerConfig;
use crate::error::BookingError;
use crate::models::appointment::{Appointment, BlockReason, BookingRequest, ClinicRef, Verdict};
use crate::models::directory::{Clinic, Doctor};
use crate::models::slot::{HourGroup, TimeSlot};
use crate::services::conflict::evaluate;
use crate::services::time_slots::{compute_disabled_slots, generate_slots, is_weekend};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum BookingPhase {
    Idle,
    SlotChosen,
    Evaluating,
    Blocked { reason: BlockReason },
    AwaitingConfirmation { existing_id: i64 },
    Submitting,
    Submitted,
    Failed { message: String },
}

impl BookingPhase {
    pub fn name(&self) -> &'static str {
        match self {
            BookingPhase::Idle => "idle",
            BookingPhase::SlotChosen => "slot_chosen",
            BookingPhase::Evaluating => "evaluating",
            BookingPhase::Blocked { .. } => "blocked",
            BookingPhase::AwaitingConfirmation { .. } => "awaiting_confirmation",
            BookingPhase::Submitting => "submitting",
            BookingPhase::Submitted => "submitted",
            BookingPhase::Failed { .. } => "failed",
        }
    }

    // A remote request or user decision is outstanding
    fn is_busy(&self) -> bool {
        matches!(
            self,
            BookingPhase::Evaluating
                | BookingPhase::AwaitingConfirmation { .. }
                | BookingPhase::Submitting
        )
    }
}

/// Identity of a doctor-appointment query. Results carrying a key that no
/// longer matches the selection are stale and get dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionKey {
    pub doctor_id: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingViewState {
    pub patient_id: Option<i64>,
    pub clinics: Vec<Clinic>,
    pub selected_clinic: Option<Clinic>,
    pub doctors: Vec<Doctor>,
    pub selected_doctor_id: Option<i64>,
    pub selected_date: NaiveDate,
    pub selected_time: Option<TimeSlot>,
    pub description: String,
    pub grid: Vec<HourGroup>,
    pub doctor_appointments: Vec<Appointment>,
    pub patient_appointments: Vec<Appointment>,
    pub phase: BookingPhase,
}

impl BookingViewState {
    pub fn new(today: NaiveDate, config: &SchedulerConfig) -> Self {
        Self {
            patient_id: None,
            clinics: Vec::new(),
            selected_clinic: None,
            doctors: Vec::new(),
            selected_doctor_id: None,
            selected_date: today,
            selected_time: None,
            description: String::new(),
            grid: generate_slots(today, config),
            doctor_appointments: Vec::new(),
            patient_appointments: Vec::new(),
            phase: BookingPhase::Idle,
        }
    }

    fn invalid(&self, event: &'static str) -> BookingError {
        BookingError::InvalidTransition {
            from: self.phase.name(),
            event,
        }
    }

    fn ensure_idle_enough(&self, event: &'static str) -> Result<(), BookingError> {
        if self.phase.is_busy() {
            return Err(self.invalid(event));
        }
        Ok(())
    }

    // Any selection change drops the chosen slot and the last outcome
    fn reset_choice(&mut self) {
        self.selected_time = None;
        self.phase = BookingPhase::Idle;
    }

    pub fn set_patient(&mut self, patient_id: i64) {
        if self.patient_id != Some(patient_id) {
            self.patient_appointments.clear();
        }
        self.patient_id = Some(patient_id);
    }

    /// Keep only clinics that accept bookings.
    pub fn set_clinics(&mut self, clinics: Vec<Clinic>) {
        self.clinics = clinics.into_iter().filter(|c| c.is_active).collect();
    }

    pub fn select_clinic(&mut self, clinic: Option<Clinic>) -> Result<(), BookingError> {
        self.ensure_idle_enough("select a clinic")?;
        self.selected_clinic = clinic;
        self.selected_doctor_id = None;
        self.doctors.clear();
        self.doctor_appointments.clear();
        self.reset_choice();
        Ok(())
    }

    /// Accept a doctor list fetched for `clinic_id`; returns false when the
    /// clinic selection has moved on.
    pub fn set_doctors(&mut self, clinic_id: i64, doctors: Vec<Doctor>) -> bool {
        if self.selected_clinic.as_ref().map(|c| c.id) != Some(clinic_id) {
            debug!("Dropping stale doctor list for clinic {}", clinic_id);
            return false;
        }
        self.doctors = doctors;
        true
    }

    /// Returns the key the caller should fetch doctor appointments for.
    pub fn select_doctor(
        &mut self,
        doctor_id: Option<i64>,
    ) -> Result<Option<SelectionKey>, BookingError> {
        self.ensure_idle_enough("select a doctor")?;
        self.selected_doctor_id = doctor_id;
        self.doctor_appointments.clear();
        self.reset_choice();
        Ok(self.selection_key())
    }

    /// Dates before `today` cannot be picked. Regenerates the grid.
    pub fn select_date(
        &mut self,
        date: NaiveDate,
        today: NaiveDate,
        config: &SchedulerConfig,
    ) -> Result<Option<SelectionKey>, BookingError> {
        self.ensure_idle_enough("select a date")?;
        if date < today {
            return Err(BookingError::PastDate(date));
        }
        self.selected_date = date;
        self.grid = generate_slots(date, config);
        self.doctor_appointments.clear();
        self.reset_choice();
        Ok(self.selection_key())
    }

    pub fn selection_key(&self) -> Option<SelectionKey> {
        self.selected_doctor_id.map(|doctor_id| SelectionKey {
            doctor_id,
            date: self.selected_date,
        })
    }

    /// Store doctor appointments unless they answer an outdated selection.
    pub fn accept_doctor_appointments(
        &mut self,
        key: SelectionKey,
        appointments: Vec<Appointment>,
    ) -> bool {
        if self.selection_key() != Some(key) {
            debug!(
                "Dropping stale appointments for doctor {} on {}",
                key.doctor_id, key.date
            );
            return false;
        }
        self.doctor_appointments = appointments;
        true
    }

    pub fn accept_patient_appointments(
        &mut self,
        patient_id: i64,
        appointments: Vec<Appointment>,
    ) -> bool {
        if self.patient_id != Some(patient_id) {
            return false;
        }
        self.patient_appointments = appointments;
        true
    }

    pub fn is_slot_disabled(&self, slot: &TimeSlot, now: NaiveDateTime) -> bool {
        compute_disabled_slots(
            &self.grid,
            self.selected_date,
            now,
            &self.doctor_appointments,
        )
        .contains(slot)
    }

    pub fn choose_slot(&mut self, slot: TimeSlot, now: NaiveDateTime) -> Result<(), BookingError> {
        self.ensure_idle_enough("choose a slot")?;
        if matches!(self.phase, BookingPhase::Submitted) {
            return Err(self.invalid("choose a slot"));
        }
        let on_grid = self.grid.iter().any(|group| group.slots.contains(&slot));
        if !on_grid || self.is_slot_disabled(&slot, now) {
            return Err(BookingError::SlotUnavailable {
                date: self.selected_date,
                time: slot.to_string(),
            });
        }
        self.selected_time = Some(slot);
        self.phase = BookingPhase::SlotChosen;
        Ok(())
    }

    pub fn booking_request(&self) -> BookingRequest {
        let clinic = self
            .selected_clinic
            .as_ref()
            .map(|c| ClinicRef {
                id: Some(c.id),
                name: c.name.clone(),
            })
            .unwrap_or_default();
        let description = self.description.trim();

        BookingRequest {
            clinic,
            doctor_id: self.selected_doctor_id,
            patient_id: self.patient_id,
            date: self.selected_date,
            time: self
                .selected_time
                .map(|slot| slot.to_string())
                .unwrap_or_default(),
            description: (!description.is_empty()).then(|| description.to_string()),
        }
    }

    /// Run the conflict checks on the current selection.
    pub fn evaluate_selection(&mut self) -> Result<Verdict, BookingError> {
        if !matches!(
            self.phase,
            BookingPhase::Idle | BookingPhase::SlotChosen | BookingPhase::Blocked { .. }
        ) {
            return Err(self.invalid("evaluate"));
        }
        if is_weekend(self.selected_date) {
            return Err(BookingError::WeekendDate(self.selected_date));
        }

        self.phase = BookingPhase::Evaluating;
        let verdict = evaluate(&self.booking_request(), &self.patient_appointments);
        self.phase = match &verdict {
            Verdict::Block { reason } => BookingPhase::Blocked { reason: *reason },
            Verdict::ConfirmReplace { existing_id } => BookingPhase::AwaitingConfirmation {
                existing_id: *existing_id,
            },
            Verdict::Proceed => BookingPhase::Submitting,
        };
        Ok(verdict)
    }

    pub fn confirm_replace(&mut self) -> Result<(), BookingError> {
        match self.phase {
            BookingPhase::AwaitingConfirmation { .. } => {
                self.phase = BookingPhase::Submitting;
                Ok(())
            }
            _ => Err(self.invalid("confirm")),
        }
    }

    pub fn cancel(&mut self) -> Result<(), BookingError> {
        match self.phase {
            BookingPhase::AwaitingConfirmation { .. } => {
                self.reset_choice();
                Ok(())
            }
            _ => Err(self.invalid("cancel")),
        }
    }

    /// Marks the booking done and clears the form.
    pub fn submission_succeeded(&mut self) -> Result<(), BookingError> {
        if self.phase != BookingPhase::Submitting {
            return Err(self.invalid("complete submission"));
        }
        self.selected_clinic = None;
        self.selected_doctor_id = None;
        self.selected_time = None;
        self.description.clear();
        self.grid.clear();
        self.doctor_appointments.clear();
        self.phase = BookingPhase::Submitted;
        Ok(())
    }

    pub fn submission_failed(&mut self, message: impl Into<String>) -> Result<(), BookingError> {
        if self.phase != BookingPhase::Submitting {
            return Err(self.invalid("fail submission"));
        }
        self.phase = BookingPhase::Failed {
            message: message.into(),
        };
        Ok(())
    }

    pub fn retry(&mut self) -> Result<(), BookingError> {
        match self.phase {
            BookingPhase::Failed { .. } => {
                self.phase = BookingPhase::SlotChosen;
                Ok(())
            }
            _ => Err(self.invalid("retry")),
        }
    }
}
