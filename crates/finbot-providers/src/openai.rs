//! OpenAI chat-completions provider with function calling.
//!
//! Exports `pub(crate)` wire types and a shared request path reused by
//! the Groq provider (any OpenAI-compatible endpoint works).

use async_trait::async_trait;
use finbot_core::{
    chat::{ChatMessage, ChatTurn, ToolDef},
    error::ProviderError,
    traits::ChatProvider,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Per-call timeout for chat completions.
pub(crate) const CHAT_TIMEOUT: Duration = Duration::from_secs(30);

/// OpenAI chat-completions provider.
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    /// Create from config values.
    pub fn from_config(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: OPENAI_BASE_URL.to_string(),
            api_key,
            model,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolEntry<'a>>,
    pub temperature: f64,
}

/// OpenAI wraps each tool definition in a `{"type":"function"}` envelope.
#[derive(Serialize)]
pub(crate) struct ToolEntry<'a> {
    #[serde(rename = "type")]
    pub entry_type: &'static str,
    pub function: &'a ToolDef,
}

#[derive(Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Option<Vec<ChatChoice>>,
    pub model: Option<String>,
    pub usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
pub(crate) struct ChatChoice {
    pub message: Option<ChatMessage>,
}

#[derive(Deserialize)]
pub(crate) struct ChatUsage {
    pub total_tokens: Option<u64>,
}

pub(crate) fn wrap_tools(tools: &[ToolDef]) -> Vec<ToolEntry<'_>> {
    tools
        .iter()
        .map(|t| ToolEntry {
            entry_type: "function",
            function: t,
        })
        .collect()
}

/// POST a chat-completion request and map the response to a `ChatTurn`.
///
/// 429 becomes `RateLimited` and a transport timeout becomes `Timeout`,
/// so the agent can decide whether the fallback provider applies.
pub(crate) async fn request_chat(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    provider: &str,
    model: &str,
    messages: &[ChatMessage],
    tools: &[ToolDef],
) -> Result<ChatTurn, ProviderError> {
    let body = ChatCompletionRequest {
        model,
        messages,
        tools: wrap_tools(tools),
        temperature: 0.1,
    };

    let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
    debug!("{provider}: POST {url} model={model}");

    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .timeout(CHAT_TIMEOUT)
        .json(&body)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(format!("{provider} request timed out: {e}"))
            } else {
                ProviderError::Other(format!("{provider} request failed: {e}"))
            }
        })?;

    let status = resp.status();
    if status.as_u16() == 429 {
        let text = resp.text().await.unwrap_or_default();
        return Err(ProviderError::RateLimited(format!(
            "{provider} returned 429: {text}"
        )));
    }
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(ProviderError::Other(format!(
            "{provider} returned {status}: {text}"
        )));
    }

    let parsed: ChatCompletionResponse = resp
        .json()
        .await
        .map_err(|e| ProviderError::Other(format!("{provider}: failed to parse response: {e}")))?;

    let message = parsed
        .choices
        .and_then(|mut c| c.drain(..).next())
        .and_then(|c| c.message)
        .ok_or_else(|| ProviderError::Other(format!("{provider}: response had no message")))?;

    Ok(ChatTurn {
        message,
        model: parsed.model,
        tokens_used: parsed.usage.and_then(|u| u.total_tokens),
    })
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDef],
    ) -> Result<ChatTurn, ProviderError> {
        request_chat(
            &self.client,
            &self.base_url,
            &self.api_key,
            "openai",
            &self.model,
            messages,
            tools,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name() {
        let p = OpenAiProvider::from_config("sk-test".into(), "gpt-5-mini".into());
        assert_eq!(p.name(), "openai");
    }

    #[test]
    fn test_request_serializes_tool_envelope() {
        let tools = vec![ToolDef {
            name: "ajuda".into(),
            description: "Mostra comandos".into(),
            parameters: serde_json::json!({"type": "object", "properties": {}}),
        }];
        let messages = vec![ChatMessage::user("oi")];
        let body = ChatCompletionRequest {
            model: "llama-3.3-70b-versatile",
            messages: &messages,
            tools: wrap_tools(&tools),
            temperature: 0.1,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["tools"][0]["type"], "function");
        assert_eq!(json["tools"][0]["function"]["name"], "ajuda");
        assert_eq!(json["temperature"], 0.1);
    }

    #[test]
    fn test_request_omits_empty_tools() {
        let messages = vec![ChatMessage::user("oi")];
        let body = ChatCompletionRequest {
            model: "m",
            messages: &messages,
            tools: Vec::new(),
            temperature: 0.1,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn test_response_parsing_text() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"Olá!"}}],"model":"gpt-5-mini","usage":{"total_tokens":42}}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        let msg = resp.choices.unwrap().remove(0).message.unwrap();
        assert_eq!(msg.content.as_deref(), Some("Olá!"));
        assert!(msg.tool_calls.is_empty());
    }

    #[test]
    fn test_response_parsing_tool_calls() {
        let json = r#"{"choices":[{"message":{
            "role":"assistant",
            "content":null,
            "tool_calls":[{"id":"call_1","type":"function",
                "function":{"name":"adicionar_gasto","arguments":"{\"valor\":50.0,\"categoria\":\"alimentacao\",\"descricao\":\"almoco\"}"}}]
        }}]}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        let msg = resp.choices.unwrap().remove(0).message.unwrap();
        assert_eq!(msg.tool_calls.len(), 1);
        assert_eq!(msg.tool_calls[0].function.name, "adicionar_gasto");
    }
}
