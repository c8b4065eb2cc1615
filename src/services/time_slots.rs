use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use std::collections::BTreeSet;
use tracing::debug;

use crate::config::SchedulerConfig;
use crate::models::appointment::Appointment;
use crate::models::slot::{HourGroup, HourGroupView, SlotView, TimeSlot};

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Build the bookable grid for one calendar day.
///
/// Weekends produce no hour groups. Every other day gets one group per hour in
/// `[start_hour, end_hour)` minus the excluded hours, each holding a slot at
/// every `interval_minutes` boundary. `config` is expected to have passed
/// [`SchedulerConfig::validate`]; for an interval that does not divide 60 the
/// grid is unspecified.
pub fn generate_slots(date: NaiveDate, config: &SchedulerConfig) -> Vec<HourGroup> {
    if is_weekend(date) {
        debug!("{} is a weekend, no slots generated", date);
        return Vec::new();
    }

    let step = config.interval_minutes.max(1) as usize;

    let groups: Vec<HourGroup> = (config.start_hour..config.end_hour)
        .filter(|hour| !config.excluded_hours.contains(hour))
        .map(|hour| HourGroup {
            hour: format!("{}:00", hour),
            slots: (0..60)
                .step_by(step)
                .filter_map(|minute| TimeSlot::new(hour, minute))
                .collect(),
        })
        .collect();

    debug!(
        "Generated {} hour groups for {} ({} min interval)",
        groups.len(),
        date,
        config.interval_minutes
    );

    groups
}

fn grid_slots(grid: &[HourGroup]) -> impl Iterator<Item = &TimeSlot> {
    grid.iter().flat_map(|group| group.slots.iter())
}

/// Slots of `grid` that have already started.
///
/// Only applies when `date` is the same calendar day as `now`; earlier or later
/// days are left alone.
pub fn past_slots(grid: &[HourGroup], date: NaiveDate, now: NaiveDateTime) -> BTreeSet<TimeSlot> {
    if date != now.date() {
        return BTreeSet::new();
    }
    grid_slots(grid)
        .filter(|slot| slot.on(date) < now)
        .copied()
        .collect()
}

/// True when an active appointment of the doctor holds this slot on `date`.
pub fn is_slot_booked(slot: &TimeSlot, date: NaiveDate, doctor_appointments: &[Appointment]) -> bool {
    doctor_appointments
        .iter()
        .any(|appt| appt.is_active() && appt.date == date && slot.matches(&appt.time))
}

/// Every slot of `grid` that is past or already booked for the doctor.
pub fn compute_disabled_slots(
    grid: &[HourGroup],
    date: NaiveDate,
    now: NaiveDateTime,
    doctor_appointments: &[Appointment],
) -> BTreeSet<TimeSlot> {
    let mut disabled = past_slots(grid, date, now);
    disabled.extend(
        grid_slots(grid)
            .filter(|slot| is_slot_booked(slot, date, doctor_appointments))
            .copied(),
    );
    disabled
}

pub fn is_slot_disabled(
    slot: &TimeSlot,
    date: NaiveDate,
    disabled: &BTreeSet<TimeSlot>,
    doctor_appointments: &[Appointment],
) -> bool {
    disabled.contains(slot) || is_slot_booked(slot, date, doctor_appointments)
}

// Attach past/booked flags to every slot of the grid
pub fn annotate_grid(
    grid: &[HourGroup],
    date: NaiveDate,
    now: NaiveDateTime,
    doctor_appointments: &[Appointment],
) -> Vec<HourGroupView> {
    let past = past_slots(grid, date, now);

    grid.iter()
        .map(|group| HourGroupView {
            hour: group.hour.clone(),
            slots: group
                .slots
                .iter()
                .map(|slot| {
                    let is_past = past.contains(slot);
                    let booked = is_slot_booked(slot, date, doctor_appointments);
                    SlotView {
                        time: *slot,
                        past: is_past,
                        booked,
                        disabled: is_past || booked,
                    }
                })
                .collect(),
        })
        .collect()
}
