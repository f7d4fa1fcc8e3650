use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::AppError;

use crate::models::{
    CreateTreatmentRequest, Recommendation, RecommendationRequest, TreatmentsQuery,
    UpdateTreatmentRequest,
};
use crate::services::recommender::NO_MATCH_MESSAGE;
use crate::services::TreatmentService;

#[axum::debug_handler]
pub async fn list_treatments(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<TreatmentsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = TreatmentService::new(&config);

    let treatments = service.list_treatments(&query).await?;

    Ok(Json(json!({
        "treatments": treatments,
        "total": treatments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_treatment(
    State(config): State<Arc<AppConfig>>,
    Path(treatment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = TreatmentService::new(&config);

    let treatment = service.get_treatment(&treatment_id).await?;

    Ok(Json(json!(treatment)))
}

#[axum::debug_handler]
pub async fn create_treatment(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<CreateTreatmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = TreatmentService::new(&config);

    let treatment = service.create_treatment(request).await?;

    Ok(Json(json!(treatment)))
}

#[axum::debug_handler]
pub async fn update_treatment(
    State(config): State<Arc<AppConfig>>,
    Path(treatment_id): Path<String>,
    Json(request): Json<UpdateTreatmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = TreatmentService::new(&config);

    let treatment = service.update_treatment(&treatment_id, request).await?;

    Ok(Json(json!(treatment)))
}

#[axum::debug_handler]
pub async fn delete_treatment(
    State(config): State<Arc<AppConfig>>,
    Path(treatment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = TreatmentService::new(&config);

    service.delete_treatment(&treatment_id).await?;

    Ok(Json(json!({
        "message": "Treatment deleted successfully"
    })))
}

#[axum::debug_handler]
pub async fn recommend_treatments(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<Value>, AppError> {
    let service = TreatmentService::new(&config);

    let recommendation = service.recommend(&request).await?;

    let response = match recommendation {
        Recommendation::Matches(matches) => json!({
            "matched": true,
            "recommendations": matches,
            "total": matches.len()
        }),
        Recommendation::NoMatch => json!({
            "matched": false,
            "recommendations": [],
            "message": NO_MATCH_MESSAGE
        }),
    };

    Ok(Json(response))
}
