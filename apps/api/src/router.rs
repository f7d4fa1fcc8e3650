use std::sync::Arc;

use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use appointment_cell::router::appointment_routes;
use assistant_cell::router::chat_routes;
use assistant_cell::AssistantState;
use doctor_cell::router::{doctor_routes, review_routes};
use patient_cell::router::patient_routes;
use schedule_cell::router::schedule_routes;
use shared_config::AppConfig;
use treatment_cell::router::treatment_routes;

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Dental Clinic API is running!" }))
        .route("/health", get(health_check))
        .nest("/api/doctors", doctor_routes(state.clone()))
        .nest("/api/patients", patient_routes(state.clone()))
        .nest("/api/appointments", appointment_routes(state.clone()))
        .nest("/api/treatments", treatment_routes(state.clone()))
        .nest("/api/schedule", schedule_routes(state.clone()))
        .nest("/api/reviews", review_routes(state.clone()))
        .nest("/api/chat", chat_routes(AssistantState::new(state)))
}
