use crate::{
    chat::{ChatMessage, ChatTurn, ToolDef},
    error::ProviderError,
};
use async_trait::async_trait;

/// Chat-completion provider — the brain.
///
/// Both the primary (Groq) and fallback (OpenAI) backends implement this
/// trait; the agent loop drives whichever it is handed.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Submit the conversation and declared tools, get one model turn.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDef],
    ) -> Result<ChatTurn, ProviderError>;
}
