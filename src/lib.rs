//! Clinic Booking Service
//!
//! Backend for the patient appointment screen: builds the daily slot grid for
//! a doctor, marks slots that are past or already taken, and decides whether
//! a patient's booking can go ahead, must be refused, or replaces an active
//! booking in the same clinic.
//!
//! # Modules
//!
//! - `services::time_slots`: slot generation and availability
//! - `services::conflict`: conflict checks against the patient's bookings
//! - `services::booking_flow`: serializable view state and booking phases
//! - `services::booking`: async orchestration over the record service
//! - `client`: `AppointmentBackend` trait and its REST implementation
//!
//! The scheduling functions are pure; the current time is always passed in.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
mod client_mock;

// Re-export the main API types for ease of use
pub use client::{AppointmentBackend, RecordServiceClient};
pub use config::{SchedulerConfig, ServiceConfig};
pub use error::{BookingError, ConfigError, RemoteError};
pub use handlers::api::{system_clock, AppState, Clock};
pub use routes::create_router;
