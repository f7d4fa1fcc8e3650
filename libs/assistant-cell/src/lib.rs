pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod state;

pub use models::*;
pub use router::chat_routes;
pub use services::{ConversationStore, GroqClient};
pub use state::AssistantState;
