use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::AppError;

use crate::models::{CreateReviewRequest, DoctorAppointmentsQuery, UpdateDoctorRequest};
use crate::services::{DoctorService, ReviewService};

#[axum::debug_handler]
pub async fn list_doctors(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);
    let doctors = service.list_doctors().await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);
    let doctor = service.get_doctor(&doctor_id).await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);
    let doctor = service.update_doctor(&doctor_id, request).await?;

    Ok(Json(json!({
        "message": "Doctor profile updated successfully",
        "doctor": doctor
    })))
}

#[axum::debug_handler]
pub async fn get_dashboard(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);
    let dashboard = service.get_dashboard(&doctor_id).await?;

    Ok(Json(json!(dashboard)))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<DoctorAppointmentsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);
    let appointments = service.get_appointments(&doctor_id, &query).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_reviews(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = ReviewService::new(&config);
    let (reviews, average_rating) = service.list_reviews(&doctor_id).await?;

    Ok(Json(json!({
        "reviews": reviews,
        "stats": {
            "average_rating": average_rating,
            "total_reviews": reviews.len()
        }
    })))
}

#[axum::debug_handler]
pub async fn create_review(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ReviewService::new(&config);
    let review = service.create_review(request).await?;

    Ok(Json(json!({
        "message": "Review submitted successfully",
        "review": review
    })))
}
