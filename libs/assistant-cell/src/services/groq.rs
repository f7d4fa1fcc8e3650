use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::models::{AssistantError, ChatMessage};

const MAX_COMPLETION_TOKENS: u32 = 1024;

/// Thin client for the Groq chat-completions endpoint.
pub struct GroqClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl GroqClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            api_url: config.groq_api_url.clone(),
            api_key: config.groq_api_key.clone(),
            model: config.groq_model.clone(),
        }
    }

    /// Sends one completion request and returns the assistant's reply text.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f64,
    ) -> Result<String, AssistantError> {
        let url = format!("{}/chat/completions", self.api_url);
        debug!("Requesting completion from {} ({} messages)", url, messages.len());

        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": MAX_COMPLETION_TOKENS
        });

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AssistantError::Groq(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Groq API error ({}): {}", status, error_text);
            return Err(AssistantError::Groq(format!(
                "Groq API error ({}): {}",
                status, error_text
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AssistantError::Groq(e.to_string()))?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                AssistantError::Groq("Completion response missing message content".to_string())
            })
    }
}
