use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ServiceConfig;
use crate::error::RemoteError;
use crate::models::appointment::{Appointment, BookingRequest};
use crate::models::directory::{Clinic, Doctor, Patient};

/// The clinic, doctor, appointment and user directories the booking flow
/// reads from, plus appointment submission.
#[async_trait]
pub trait AppointmentBackend: Send + Sync {
    async fn list_clinics(&self) -> Result<Vec<Clinic>, RemoteError>;

    async fn list_doctors(&self, clinic_id: i64) -> Result<Vec<Doctor>, RemoteError>;

    async fn appointments_by_doctor(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, RemoteError>;

    async fn appointments_by_patient(&self, patient_id: i64) -> Result<Vec<Appointment>, RemoteError>;

    async fn find_patient_by_email(&self, email: &str) -> Result<Patient, RemoteError>;

    /// On success the record service supersedes the patient's previous active
    /// booking in the same clinic, if any.
    async fn create_appointment(&self, request: &BookingRequest) -> Result<(), RemoteError>;
}

/// Clinics open for booking.
pub async fn list_active_clinics(
    backend: &dyn AppointmentBackend,
) -> Result<Vec<Clinic>, RemoteError> {
    let clinics = backend.list_clinics().await?;
    Ok(clinics.into_iter().filter(|c| c.is_active).collect())
}

// Request body the record service expects for a new appointment
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentPayload<'a> {
    pub clinic_id: Option<i64>,
    pub date: String,
    pub time: &'a str,
    pub description: &'a str,
    pub doctor: EntityReference,
    pub patient: EntityReference,
}

#[derive(Debug, Serialize)]
pub struct EntityReference {
    pub id: Option<i64>,
}

impl<'a> From<&'a BookingRequest> for CreateAppointmentPayload<'a> {
    fn from(request: &'a BookingRequest) -> Self {
        Self {
            clinic_id: request.clinic.id,
            date: request.date.format("%Y-%m-%d").to_string(),
            time: &request.time,
            description: request.description_or_default(),
            doctor: EntityReference {
                id: request.doctor_id,
            },
            patient: EntityReference {
                id: request.patient_id,
            },
        }
    }
}

/// REST client for the clinic record service
pub struct RecordServiceClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RecordServiceClient {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, RemoteError> {
        Self::new(
            config.record_service_url.clone(),
            config.record_service_token.clone(),
            config.request_timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(res: Response, path: &str) -> Result<Response, RemoteError> {
        let status = res.status();
        info!("Response received from {} with status: {}", path, status);

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(res)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RemoteError> {
        let url = self.url(path);
        debug!("API URL: {}", url);

        let request = self.authorized(self.client.get(&url).query(query));
        let res = Self::check(request.send().await?, path).await?;
        Ok(res.json::<T>().await?)
    }
}

#[async_trait]
impl AppointmentBackend for RecordServiceClient {
    async fn list_clinics(&self) -> Result<Vec<Clinic>, RemoteError> {
        info!("Making request to list clinics");
        self.get_json("/clinics", &[]).await
    }

    async fn list_doctors(&self, clinic_id: i64) -> Result<Vec<Doctor>, RemoteError> {
        info!("Making request to list doctors of clinic {}", clinic_id);
        self.get_json(&format!("/clinics/{}/doctors", clinic_id), &[])
            .await
    }

    async fn appointments_by_doctor(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, RemoteError> {
        info!("Fetching appointments of doctor {} on {}", doctor_id, date);
        self.get_json(
            &format!("/appointments/doctor/{}", doctor_id),
            &[("date", date.format("%Y-%m-%d").to_string())],
        )
        .await
    }

    async fn appointments_by_patient(&self, patient_id: i64) -> Result<Vec<Appointment>, RemoteError> {
        info!("Fetching appointments of patient {}", patient_id);
        self.get_json(&format!("/appointments/patient/{}", patient_id), &[])
            .await
    }

    async fn find_patient_by_email(&self, email: &str) -> Result<Patient, RemoteError> {
        debug!("Resolving patient by email");
        self.get_json("/users/by-email", &[("email", email.to_string())])
            .await
    }

    async fn create_appointment(&self, request: &BookingRequest) -> Result<(), RemoteError> {
        let path = "/appointments";
        let payload = CreateAppointmentPayload::from(request);
        info!(
            "Submitting appointment for doctor {:?} on {} at {}",
            payload.doctor.id, payload.date, payload.time
        );

        let res = self
            .authorized(self.client.post(self.url(path)).json(&payload))
            .send()
            .await?;
        Self::check(res, path).await?;
        Ok(())
    }
}
