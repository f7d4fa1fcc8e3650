use std::sync::Arc;

use shared_config::AppConfig;

use crate::services::ConversationStore;

/// Shared handler state: the app config plus the conversation store
/// that outlives individual requests.
#[derive(Clone)]
pub struct AssistantState {
    pub config: Arc<AppConfig>,
    pub conversations: Arc<ConversationStore>,
}

impl AssistantState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            conversations: Arc::new(ConversationStore::new()),
        }
    }
}
