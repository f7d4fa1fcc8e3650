use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub specialization: String,
    pub experience: i32,
    pub fees: f64,
    pub description: Option<String>,
    pub profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub experience: Option<i32>,
    pub fees: Option<f64>,
    pub description: Option<String>,
    pub profile_pic: Option<String>,
}

/// Listing row with booking and review counts for the directory view.
#[derive(Debug, Serialize)]
pub struct DoctorWithCounts {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub appointment_count: usize,
    pub review_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewWithPatient {
    #[serde(flatten)]
    pub review: Review,
    pub patient_name: Option<String>,
}

/// Weekly schedule row as embedded in the doctor detail view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub day: String,
    pub is_off: bool,
    #[serde(default)]
    pub off_slots: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreatmentSummary {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub duration: i32,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DoctorDetail {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub schedules: Vec<ScheduleSummary>,
    pub treatments: Vec<TreatmentSummary>,
    pub reviews: Vec<ReviewWithPatient>,
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

#[derive(Debug, Serialize)]
pub struct AppointmentWithRelations {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time_slot: String,
    pub status: String,
    pub notes: Option<String>,
    pub patient: Option<PatientSummary>,
    pub treatment: Option<TreatmentSummary>,
}

/// Today's booking on the dashboard, with display names attached.
#[derive(Debug, Serialize)]
pub struct DashboardAppointment {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time_slot: String,
    pub status: String,
    pub patient_name: Option<String>,
    pub treatment_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_appointments: usize,
    pub total_patients: usize,
    pub average_rating: f64,
    pub today_appointments: usize,
}

#[derive(Debug, Serialize)]
pub struct DoctorDashboard {
    pub stats: DashboardStats,
    pub today_appointments: Vec<DashboardAppointment>,
    pub recent_reviews: Vec<ReviewWithPatient>,
}

#[derive(Debug, Deserialize)]
pub struct DoctorAppointmentsQuery {
    pub status: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Not authorized to review this appointment")]
    ReviewNotAuthorized,

    #[error("Invalid doctor data: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
            DoctorError::ReviewNotAuthorized => {
                AppError::Unauthorized("Not authorized to review this appointment".to_string())
            }
            DoctorError::Validation(msg) => AppError::InvalidInput(msg),
            DoctorError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}
