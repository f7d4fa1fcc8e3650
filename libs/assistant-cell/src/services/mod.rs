pub mod agents;
pub mod groq;
pub mod store;

pub use agents::{agent_for, route_message, Agent, AgentContext};
pub use groq::GroqClient;
pub use store::ConversationStore;
