use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn treatment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_treatments).post(handlers::create_treatment),
        )
        .route("/recommendations", post(handlers::recommend_treatments))
        .route(
            "/{treatment_id}",
            get(handlers::get_treatment)
                .put(handlers::update_treatment)
                .delete(handlers::delete_treatment),
        )
        .with_state(state)
}
