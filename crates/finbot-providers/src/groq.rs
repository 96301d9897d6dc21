//! Groq provider — primary model, OpenAI-compatible endpoint.

use crate::openai::request_chat;
use async_trait::async_trait;
use finbot_core::{
    chat::{ChatMessage, ChatTurn, ToolDef},
    error::ProviderError,
    traits::ChatProvider,
};

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Groq chat-completions provider.
pub struct GroqProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GroqProvider {
    /// Create from config values.
    pub fn from_config(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl ChatProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDef],
    ) -> Result<ChatTurn, ProviderError> {
        request_chat(
            &self.client,
            GROQ_BASE_URL,
            &self.api_key,
            "groq",
            &self.model,
            messages,
            tools,
        )
        .await
    }
}
