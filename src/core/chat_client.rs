use async_trait::async_trait;
use tracing::debug;

use crate::api::{ChatMessage, ChatRequest, ChatResponse};
use crate::core::completion::{Completion, CompletionError, CompletionService, RequestContext};
use crate::core::config::Config;
use crate::core::message::Message;
use crate::utils::auth::add_auth_headers;
use crate::utils::url::construct_api_url;

const MAX_TOKENS: u32 = 1024;
const TEMPERATURE: f32 = 0.7;

/// Non-streaming client for an OpenAI-compatible `chat/completions`
/// endpoint (OpenRouter by default).
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, CompletionError> {
        let api_key = config
            .resolve_api_key()
            .ok_or(CompletionError::MissingApiKey)?;
        Ok(Self::new(config.resolved_base_url(), api_key))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: &ChatRequest) -> Result<Completion, CompletionError> {
        let chat_url = construct_api_url(&self.base_url, "chat/completions");
        let http_request = add_auth_headers(self.client.post(chat_url), &self.api_key);

        let response = http_request.json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: summarize_api_error(&error_text),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        Ok(Completion::from(parsed))
    }
}

#[async_trait]
impl CompletionService for ChatClient {
    async fn complete(
        &self,
        ctx: &RequestContext,
        history: Vec<Message>,
        model: &str,
    ) -> Result<Completion, CompletionError> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: history.iter().map(ChatMessage::from).collect(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        debug!(
            model,
            messages = request.messages.len(),
            timeout_secs = ctx.timeout().as_secs(),
            "Sending completion request"
        );
        ctx.run(self.send(&request)).await
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .or_else(|| value.get("error").and_then(|v| v.as_str()))
        .or_else(|| value.get("message").and_then(|v| v.as_str()))?;

    let collapsed = summary.split_whitespace().collect::<Vec<_>>().join(" ");
    Some(collapsed).filter(|text| !text.is_empty())
}

/// Reduce an error body to one readable line: the API's own message when the
/// body is JSON that carries one, otherwise the trimmed body.
pub fn summarize_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| extract_error_summary(&value))
        .unwrap_or_else(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConfigKey;

    #[test]
    fn summary_prefers_nested_error_message() {
        let raw = r#"{"error":{"message":"model   overloaded","code":503}}"#;
        assert_eq!(summarize_api_error(raw), "model overloaded");
    }

    #[test]
    fn summary_reads_flat_error_and_message_fields() {
        assert_eq!(summarize_api_error(r#"{"error":"bad key"}"#), "bad key");
        assert_eq!(summarize_api_error(r#"{"message":"nope"}"#), "nope");
    }

    #[test]
    fn summary_falls_back_to_trimmed_body() {
        assert_eq!(summarize_api_error("  gateway timeout \n"), "gateway timeout");
        assert_eq!(summarize_api_error(r#"{"status":"failed"}"#), r#"{"status":"failed"}"#);
        assert_eq!(summarize_api_error("   "), "<empty>");
    }

    #[test]
    fn from_config_uses_configured_base_url() {
        let mut config = Config::default();
        config.set(ConfigKey::BaseUrl, "https://example.test/v1");
        config.set(ConfigKey::ApiKey, "sk-test");
        let client = ChatClient::from_config(&config).expect("client");
        assert_eq!(client.base_url(), "https://example.test/v1");
    }
}
