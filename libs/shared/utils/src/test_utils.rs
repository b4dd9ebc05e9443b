use std::sync::Arc;
use serde_json::{json, Value};

use shared_config::AppConfig;

pub struct TestConfig {
    pub clinic_api_url: String,
    pub timeout_secs: u64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            clinic_api_url: "http://localhost:3000".to_string(),
            timeout_secs: 2,
        }
    }
}

impl TestConfig {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            clinic_api_url: url.into(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            clinic_api_url: self.clinic_api_url.clone(),
            clinic_api_timeout_secs: self.timeout_secs,
            bind_address: "127.0.0.1:0".to_string(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Response bodies shaped like the clinic backend's JSON.
pub struct MockClinicResponses;

impl MockClinicResponses {
    pub fn specialties() -> Value {
        json!([
            { "id": 1, "name": "Cardiologia", "doctors": [] },
            { "id": 2, "name": "Dermatologia", "doctors": [] },
            { "id": 3, "name": "Ortopedia", "doctors": [] },
            { "id": 4, "name": "Pediatria", "doctors": [] },
            { "id": 5, "name": "Clínica Geral", "doctors": [] }
        ])
    }

    pub fn doctor_response(id: i64, name: &str, specialty_id: i64) -> Value {
        json!({
            "id": id,
            "name": name,
            "email": format!("doctor{}@supersaudavel.com", id),
            "specialtyId": specialty_id
        })
    }

    pub fn cardiology_doctors() -> Value {
        json!([
            Self::doctor_response(1, "Dr. João Silva", 1),
            Self::doctor_response(6, "Dra. Ana Costa", 1)
        ])
    }

    pub fn patient_response(id: i64, name: &str, email: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "email": email,
            "phone": null,
            "birthDate": null,
            "appointments": []
        })
    }

    pub fn appointment_response(id: i64, patient_id: i64, doctor_id: i64, date_time: &str) -> Value {
        json!({
            "id": id,
            "patientId": patient_id,
            "doctorId": doctor_id,
            "dateTime": date_time,
            "status": "SCHEDULED",
            "notes": null
        })
    }

    pub fn error_response() -> Value {
        json!({
            "error": "Ocorreu um erro interno no servidor."
        })
    }
}
