use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Returns at most the first five characters of a stored time string.
///
/// Remote records carry times such as `"14:00:00"`; slots are compared on the
/// `HH:MM` prefix only.
pub fn time_prefix(time: &str) -> &str {
    match time.char_indices().nth(5) {
        Some((idx, _)) => &time[..idx],
        None => time,
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid slot time {0:?}, expected HH:MM")]
pub struct ParseSlotError(pub String);

/// A bookable wall-clock time of day at `HH:MM` granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TimeSlot(NaiveTime);

impl TimeSlot {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(TimeSlot)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// The instant this slot starts on the given calendar day.
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.0)
    }

    /// True when `stored` (e.g. `"09:40:00"`) starts with this slot's label.
    pub fn matches(&self, stored: &str) -> bool {
        time_prefix(stored) == self.to_string()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeSlot {
    type Err = ParseSlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let prefix = time_prefix(s.trim());
        let (hour, minute) = prefix
            .split_once(':')
            .ok_or_else(|| ParseSlotError(s.to_string()))?;
        if hour.len() != 2 || minute.len() != 2 {
            return Err(ParseSlotError(s.to_string()));
        }
        let hour = hour.parse().map_err(|_| ParseSlotError(s.to_string()))?;
        let minute = minute.parse().map_err(|_| ParseSlotError(s.to_string()))?;
        TimeSlot::new(hour, minute).ok_or_else(|| ParseSlotError(s.to_string()))
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = ParseSlotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}

// One hour of the grid, e.g. "9:00" with 09:00, 09:20, 09:40
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourGroup {
    pub hour: String,
    pub slots: Vec<TimeSlot>,
}

// A slot as shown to the patient; disabled slots stay visible
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotView {
    pub time: TimeSlot,
    pub past: bool,
    pub booked: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourGroupView {
    pub hour: String,
    pub slots: Vec<SlotView>,
}

// Response structure for the slot grid endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct SlotGridResponse {
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub weekend: bool,
    pub groups: Vec<HourGroupView>,
}
