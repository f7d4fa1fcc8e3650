use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::AppError;

use crate::models::{AvailabilityQuery, SetWeeklyScheduleRequest, UpsertOverrideRequest};
use crate::services::{AvailabilityService, ScheduleService};

#[axum::debug_handler]
pub async fn get_weekly_schedule(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&config);

    let schedule = service.get_weekly_schedule(&doctor_id).await?;

    Ok(Json(json!({
        "schedule": schedule,
        "total": schedule.len()
    })))
}

#[axum::debug_handler]
pub async fn set_weekly_schedule(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Json(request): Json<SetWeeklyScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&config);

    let schedule = service.set_weekly_schedule(&doctor_id, request).await?;

    Ok(Json(json!({
        "message": "Schedule updated successfully",
        "schedule": schedule,
        "total": schedule.len()
    })))
}

#[axum::debug_handler]
pub async fn list_overrides(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&config);

    let overrides = service.list_overrides(&doctor_id).await?;

    Ok(Json(json!({
        "overrides": overrides,
        "total": overrides.len()
    })))
}

#[axum::debug_handler]
pub async fn upsert_override(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Json(request): Json<UpsertOverrideRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&config);

    let saved = service.upsert_override(&doctor_id, request).await?;

    Ok(Json(json!(saved)))
}

#[axum::debug_handler]
pub async fn delete_override(
    State(config): State<Arc<AppConfig>>,
    Path((doctor_id, override_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&config);

    service.delete_override(&doctor_id, &override_id).await?;

    Ok(Json(json!({
        "message": "Schedule override deleted successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&config);

    let availability = service.get_availability(&doctor_id, &query).await?;

    Ok(Json(json!(availability)))
}
