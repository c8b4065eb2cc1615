use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::mock;

use crate::client::AppointmentBackend;
use crate::error::RemoteError;
use crate::models::appointment::{Appointment, BookingRequest};
use crate::models::directory::{Clinic, Doctor, Patient};

// Define a mock for the record service
mock! {
    pub Backend {}

    #[async_trait]
    impl AppointmentBackend for Backend {
        async fn list_clinics(&self) -> Result<Vec<Clinic>, RemoteError>;

        async fn list_doctors(&self, clinic_id: i64) -> Result<Vec<Doctor>, RemoteError>;

        async fn appointments_by_doctor(
            &self,
            doctor_id: i64,
            date: NaiveDate,
        ) -> Result<Vec<Appointment>, RemoteError>;

        async fn appointments_by_patient(
            &self,
            patient_id: i64,
        ) -> Result<Vec<Appointment>, RemoteError>;

        async fn find_patient_by_email(&self, email: &str) -> Result<Patient, RemoteError>;

        async fn create_appointment(&self, request: &BookingRequest) -> Result<(), RemoteError>;
    }
}
