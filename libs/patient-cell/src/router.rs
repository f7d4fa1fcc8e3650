use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers::{get_patient, list_patients, update_patient};

pub fn patient_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(list_patients))
        .route("/{patient_id}", get(get_patient).put(update_patient))
        .with_state(state)
}
