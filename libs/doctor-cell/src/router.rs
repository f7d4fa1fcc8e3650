use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers::{
    create_review, get_dashboard, get_doctor, get_doctor_appointments, get_doctor_reviews,
    list_doctors, update_doctor,
};

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(list_doctors))
        .route("/{doctor_id}", get(get_doctor).put(update_doctor))
        .route("/{doctor_id}/dashboard", get(get_dashboard))
        .route("/{doctor_id}/appointments", get(get_doctor_appointments))
        .route("/{doctor_id}/reviews", get(get_doctor_reviews))
        .with_state(state)
}

pub fn review_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(create_review))
        .with_state(state)
}
