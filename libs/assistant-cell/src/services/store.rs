use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use crate::models::ChatMessage;

/// How many messages a conversation keeps (five exchanges).
pub const MESSAGE_WINDOW: usize = 10;

const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);
const DEFAULT_MAX_CONVERSATIONS: usize = 100;

struct Conversation {
    messages: Vec<ChatMessage>,
    last_active: Instant,
}

/// In-memory chat history keyed by conversation id. Entries expire
/// after a TTL of inactivity, and when the store is full the least
/// recently active conversation is evicted.
pub struct ConversationStore {
    conversations: RwLock<HashMap<String, Conversation>>,
    ttl: Duration,
    max_conversations: usize,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_TTL, DEFAULT_MAX_CONVERSATIONS)
    }

    pub fn with_limits(ttl: Duration, max_conversations: usize) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            ttl,
            max_conversations,
        }
    }

    /// Messages recorded so far, oldest first. Unknown or expired
    /// conversations read as empty.
    pub async fn history(&self, conversation_id: &str) -> Vec<ChatMessage> {
        let conversations = self.conversations.read().await;
        match conversations.get(conversation_id) {
            Some(conversation) if conversation.last_active.elapsed() <= self.ttl => {
                conversation.messages.clone()
            }
            _ => Vec::new(),
        }
    }

    /// Records one user/assistant exchange and returns the message
    /// count after trimming to the window.
    pub async fn append_exchange(
        &self,
        conversation_id: &str,
        user: ChatMessage,
        assistant: ChatMessage,
    ) -> usize {
        let mut conversations = self.conversations.write().await;

        let ttl = self.ttl;
        conversations.retain(|_, c| c.last_active.elapsed() <= ttl);

        let conversation = conversations
            .entry(conversation_id.to_string())
            .or_insert_with(|| Conversation {
                messages: Vec::new(),
                last_active: Instant::now(),
            });

        conversation.messages.push(user);
        conversation.messages.push(assistant);
        if conversation.messages.len() > MESSAGE_WINDOW {
            let excess = conversation.messages.len() - MESSAGE_WINDOW;
            conversation.messages.drain(..excess);
        }
        conversation.last_active = Instant::now();
        let message_count = conversation.messages.len();

        if conversations.len() > self.max_conversations {
            if let Some(oldest) = conversations
                .iter()
                .min_by_key(|(_, c)| c.last_active)
                .map(|(id, _)| id.clone())
            {
                debug!("Evicting least recently active conversation {}", oldest);
                conversations.remove(&oldest);
            }
        }

        message_count
    }

    /// Drops a conversation. Returns false if it was not present.
    pub async fn remove(&self, conversation_id: &str) -> bool {
        let mut conversations = self.conversations.write().await;
        conversations.remove(conversation_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
