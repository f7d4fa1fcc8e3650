use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use schedule_cell::ScheduleError;
use shared_models::AppError;
use treatment_cell::TreatmentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: Option<String>,
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
}

/// Which specialist handles a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Clinic,
    Appointment,
    Treatment,
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AgentKind::Clinic => "clinic",
            AgentKind::Appointment => "appointment",
            AgentKind::Treatment => "treatment",
        };
        write!(f, "{}", name)
    }
}

/// What an agent produced for one message: the reply text plus any
/// structured data the frontend can render alongside it.
#[derive(Debug)]
pub struct AgentReply {
    pub content: String,
    pub metadata: Value,
}

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Message is required")]
    EmptyMessage,

    #[error("Conversation not found")]
    ConversationNotFound,

    #[error("Language model request failed: {0}")]
    Groq(String),

    #[error("Agent execution failed: {0}")]
    Agent(String),
}

impl From<ScheduleError> for AssistantError {
    fn from(err: ScheduleError) -> Self {
        AssistantError::Agent(err.to_string())
    }
}

impl From<TreatmentError> for AssistantError {
    fn from(err: TreatmentError) -> Self {
        AssistantError::Agent(err.to_string())
    }
}

impl From<serde_json::Error> for AssistantError {
    fn from(err: serde_json::Error) -> Self {
        AssistantError::Agent(err.to_string())
    }
}

impl From<AssistantError> for AppError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::EmptyMessage => {
                AppError::InvalidInput("Message is required".to_string())
            }
            AssistantError::ConversationNotFound => {
                AppError::NotFound("Conversation not found".to_string())
            }
            AssistantError::Groq(msg) => AppError::ExternalService(msg),
            AssistantError::Agent(msg) => AppError::ExternalService(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_roles_serialize_lowercase() {
        let message = ChatMessage::user("hello");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["content"], "hello");
    }

    #[test]
    fn test_agent_kind_display_names() {
        assert_eq!(AgentKind::Clinic.to_string(), "clinic");
        assert_eq!(AgentKind::Appointment.to_string(), "appointment");
        assert_eq!(AgentKind::Treatment.to_string(), "treatment");
    }
}
