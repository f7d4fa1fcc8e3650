use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePatientRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub profile_pic: Option<String>,
}

/// Listing row with a booking count for the clinic roster view.
#[derive(Debug, Serialize)]
pub struct PatientWithCount {
    #[serde(flatten)]
    pub patient: Patient,
    pub appointment_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreatmentSummary {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price: f64,
}

/// Appointment row as stored, before relations are attached.
#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentRow {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub treatment_id: Uuid,
    pub date: NaiveDate,
    pub time_slot: String,
    pub status: String,
    pub notes: Option<String>,
}

/// One visit in the patient's history, with doctor and treatment details.
#[derive(Debug, Serialize)]
pub struct PatientAppointment {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time_slot: String,
    pub status: String,
    pub notes: Option<String>,
    pub doctor: Option<DoctorSummary>,
    pub treatment: Option<TreatmentSummary>,
}

#[derive(Debug, Serialize)]
pub struct PatientDetail {
    #[serde(flatten)]
    pub patient: Patient,
    pub appointments: Vec<PatientAppointment>,
}

#[derive(Debug, Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Invalid patient data: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AppError::NotFound("Patient not found".to_string()),
            PatientError::Validation(msg) => AppError::InvalidInput(msg),
            PatientError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}
