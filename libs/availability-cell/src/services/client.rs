use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde_json::json;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::ClinicApiClient;
use shared_models::{
    Appointment, CreateAppointmentRequest, Doctor, EntityId, FindOrCreatePatientRequest,
    Patient, Specialty,
};

use crate::error::AvailabilityError;

/// Typed access to the clinic backend.
///
/// Implementations must be safe to share between concurrent conversations.
#[async_trait]
pub trait AvailabilityClient: Send + Sync {
    async fn list_specialties(&self) -> Result<Vec<Specialty>, AvailabilityError>;

    /// Doctors for a specialty, in backend order.
    async fn list_doctors(&self, specialty_id: &EntityId) -> Result<Vec<Doctor>, AvailabilityError>;

    /// Free `HH:MM` slots for a doctor on a day. An empty list means no availability.
    async fn list_available_slots(
        &self,
        doctor_id: &EntityId,
        date: NaiveDate,
    ) -> Result<Vec<String>, AvailabilityError>;

    /// Looks the patient up by email and creates it when missing.
    async fn find_or_create_patient(&self, email: &str, name: &str) -> Result<Patient, AvailabilityError>;

    async fn create_appointment(
        &self,
        patient_id: &EntityId,
        doctor_id: &EntityId,
        date_time: DateTime<Utc>,
    ) -> Result<Appointment, AvailabilityError>;
}

pub struct HttpAvailabilityClient {
    api: ClinicApiClient,
}

impl HttpAvailabilityClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            api: ClinicApiClient::new(config),
        }
    }
}

#[async_trait]
impl AvailabilityClient for HttpAvailabilityClient {
    async fn list_specialties(&self) -> Result<Vec<Specialty>, AvailabilityError> {
        debug!("Fetching specialties");

        let specialties: Vec<Specialty> = self.api.get("/specialties", None).await?;
        Ok(specialties)
    }

    async fn list_doctors(&self, specialty_id: &EntityId) -> Result<Vec<Doctor>, AvailabilityError> {
        debug!("Fetching doctors for specialty: {}", specialty_id);

        let path = format!("/doctors/specialty/{}", specialty_id);
        let doctors: Vec<Doctor> = self.api.get(&path, None).await?;
        Ok(doctors)
    }

    async fn list_available_slots(
        &self,
        doctor_id: &EntityId,
        date: NaiveDate,
    ) -> Result<Vec<String>, AvailabilityError> {
        let date_key = date.format("%Y-%m-%d").to_string();
        debug!("Fetching available slots for doctor {} on {}", doctor_id, date_key);

        let path = format!("/doctors/{}/available-slots", doctor_id);
        let params = [("date", date_key.as_str())];
        let slots: Vec<String> = self.api.get(&path, Some(&params[..])).await?;

        for slot in &slots {
            if !is_slot_format(slot) {
                warn!("Backend returned invalid slot '{}' for doctor {}", slot, doctor_id);
                return Err(AvailabilityError::MalformedResponse(format!(
                    "slot '{}' is not in HH:MM form",
                    slot
                )));
            }
        }

        debug!("Doctor {} has {} free slots on {}", doctor_id, slots.len(), date_key);
        Ok(slots)
    }

    async fn find_or_create_patient(&self, email: &str, name: &str) -> Result<Patient, AvailabilityError> {
        debug!("Resolving patient by email: {}", email);

        let request = FindOrCreatePatientRequest {
            email: email.to_string(),
            name: name.to_string(),
        };
        let patient: Patient = self.api.post("/patients", json!(request)).await?;
        Ok(patient)
    }

    async fn create_appointment(
        &self,
        patient_id: &EntityId,
        doctor_id: &EntityId,
        date_time: DateTime<Utc>,
    ) -> Result<Appointment, AvailabilityError> {
        debug!("Creating appointment for patient {} with doctor {} at {}", patient_id, doctor_id, date_time);

        let request = CreateAppointmentRequest {
            patient_id: patient_id.clone(),
            doctor_id: doctor_id.clone(),
            date_time,
        };
        let appointment: Appointment = self.api.post("/appointments", json!(request)).await?;
        Ok(appointment)
    }
}

fn is_slot_format(slot: &str) -> bool {
    slot.len() == 5 && NaiveTime::parse_from_str(slot, "%H:%M").is_ok()
}
