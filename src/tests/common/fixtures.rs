use chrono::{NaiveDate, NaiveDateTime};

use crate::config::SchedulerConfig;
use crate::models::appointment::{Appointment, AppointmentStatus, BookingRequest, ClinicRef};
use crate::models::directory::{Clinic, Doctor, Patient};
use crate::models::slot::TimeSlot;

pub fn config() -> SchedulerConfig {
    SchedulerConfig::default()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn at(d: &str, time: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("{} {}", d, time), "%Y-%m-%d %H:%M").unwrap()
}

/// Monday 2035-03-05, 10:05.
pub fn weekday_morning() -> NaiveDateTime {
    at("2035-03-05", "10:05")
}

pub fn slot(s: &str) -> TimeSlot {
    s.parse().unwrap()
}

pub fn clinic(id: i64, name: &str, is_active: bool) -> Clinic {
    Clinic {
        id,
        name: name.to_string(),
        is_active,
    }
}

pub fn doctor(id: i64, name: &str, surname: &str) -> Doctor {
    Doctor {
        id,
        name: name.to_string(),
        surname: surname.to_string(),
    }
}

pub fn patient(id: i64, email: &str) -> Patient {
    Patient {
        id,
        email: email.to_string(),
        name: "Test".to_string(),
        surname: "Patient".to_string(),
    }
}

pub fn appointment(
    id: i64,
    date: NaiveDate,
    time: &str,
    clinic_id: i64,
    clinic_name: &str,
    status: AppointmentStatus,
) -> Appointment {
    Appointment {
        id,
        date,
        time: time.to_string(),
        clinic: ClinicRef {
            id: Some(clinic_id),
            name: clinic_name.to_string(),
        },
        status,
        description: None,
    }
}

pub fn active_appointment(
    id: i64,
    date: NaiveDate,
    time: &str,
    clinic_id: i64,
    clinic_name: &str,
) -> Appointment {
    appointment(id, date, time, clinic_id, clinic_name, AppointmentStatus::Active)
}

pub fn request(clinic_id: i64, clinic_name: &str, date: NaiveDate, time: &str) -> BookingRequest {
    BookingRequest {
        clinic: ClinicRef {
            id: Some(clinic_id),
            name: clinic_name.to_string(),
        },
        doctor_id: Some(7),
        patient_id: Some(42),
        date,
        time: time.to_string(),
        description: None,
    }
}
