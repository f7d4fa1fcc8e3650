use axum::{
    routing::{delete, post},
    Router,
};

use crate::handlers::{chat, clear_conversation};
use crate::state::AssistantState;

pub fn chat_routes(state: AssistantState) -> Router {
    Router::new()
        .route("/", post(chat))
        .route("/{conversation_id}", delete(clear_conversation))
        .with_state(state)
}
