use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use shared_models::AppError;

use crate::models::{AgentReply, AssistantError, ChatMessage, ChatRequest};
use crate::services::agents::{agent_for, route_message, AgentContext, APOLOGY_MESSAGE};
use crate::state::AssistantState;

#[axum::debug_handler]
pub async fn chat(
    State(state): State<AssistantState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Value>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AssistantError::EmptyMessage.into());
    }

    let conversation_id = request
        .conversation_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let history = state.conversations.history(&conversation_id).await;

    let kind = route_message(&request.message);
    info!("Routing chat message in {} to {} agent", conversation_id, kind);

    let context = AgentContext {
        doctor_id: request.doctor_id,
        patient_id: request.patient_id,
        history,
    };

    let agent = agent_for(kind, &state.config);
    let reply = match agent.invoke(&request.message, &context).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Agent execution error: {}", e);
            AgentReply {
                content: APOLOGY_MESSAGE.to_string(),
                metadata: json!({ "error": e.to_string() }),
            }
        }
    };

    let message_count = state
        .conversations
        .append_exchange(
            &conversation_id,
            ChatMessage::user(&request.message),
            ChatMessage::assistant(&reply.content),
        )
        .await;

    Ok(Json(json!({
        "success": true,
        "response": reply.content,
        "agent": kind.to_string(),
        "conversation_id": conversation_id,
        "conversation_length": message_count / 2,
        "metadata": reply.metadata
    })))
}

#[axum::debug_handler]
pub async fn clear_conversation(
    State(state): State<AssistantState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !state.conversations.remove(&conversation_id).await {
        return Err(AssistantError::ConversationNotFound.into());
    }

    Ok(Json(json!({
        "success": true,
        "message": "Conversation cleared"
    })))
}
