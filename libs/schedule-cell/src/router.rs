use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn schedule_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route(
            "/{doctor_id}",
            get(handlers::get_weekly_schedule).put(handlers::set_weekly_schedule),
        )
        .route(
            "/{doctor_id}/overrides",
            get(handlers::list_overrides).post(handlers::upsert_override),
        )
        .route(
            "/{doctor_id}/overrides/{override_id}",
            delete(handlers::delete_override),
        )
        .route("/{doctor_id}/availability", get(handlers::get_availability))
        .with_state(state)
}
