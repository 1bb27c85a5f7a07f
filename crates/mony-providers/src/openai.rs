//! OpenAI-compatible chat completion provider.
//!
//! Works with OpenAI's API and any compatible endpoint. Structured prompts
//! use `response_format: json_object` and the reply content is parsed as
//! JSON before it is handed back.

use async_trait::async_trait;
use mony_core::{
    config::OpenAiConfig,
    context::{ApiMessage, Completion, PromptBundle},
    error::MonyError,
    traits::Provider,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

/// OpenAI-compatible provider.
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    /// Create from config values.
    pub fn from_config(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    pub fn new(config: &OpenAiConfig) -> Self {
        Self::from_config(
            config.base_url.clone(),
            config.api_key.clone(),
            config.model.clone(),
        )
    }
}

pub(crate) fn build_openai_messages(api_messages: &[ApiMessage]) -> Vec<ChatMessage> {
    api_messages
        .iter()
        .map(|m| ChatMessage {
            role: m.role.clone(),
            content: m.content.clone(),
        })
        .collect()
}

#[derive(Serialize, Deserialize, Clone)]
pub(crate) struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize)]
pub(crate) struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl ChatCompletionRequest {
    pub(crate) fn for_prompt(prompt: &PromptBundle, default_model: &str) -> Self {
        Self {
            model: prompt
                .model
                .as_deref()
                .unwrap_or(default_model)
                .to_string(),
            messages: build_openai_messages(&prompt.to_api_messages()),
            response_format: prompt.structured.then_some(ResponseFormat {
                kind: "json_object",
            }),
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Option<Vec<ChatChoice>>,
    pub usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
pub(crate) struct ChatChoice {
    pub message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
pub(crate) struct ChatResponseMessage {
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct ChatUsage {
    pub total_tokens: Option<u64>,
}

impl ChatCompletionResponse {
    fn content(&self) -> Option<&str> {
        self.choices
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
    }
}

/// Turn the reply content into a [`Completion`] of the requested shape.
pub(crate) fn into_completion(content: &str, structured: bool) -> Result<Completion, MonyError> {
    if !structured {
        return Ok(Completion::Text(content.to_string()));
    }
    serde_json::from_str(content)
        .map(Completion::Json)
        .map_err(|e| MonyError::Parse(format!("openai returned invalid JSON: {e}")))
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, prompt: &PromptBundle) -> Result<Completion, MonyError> {
        if self.api_key.is_empty() {
            warn!("openai: no API key configured");
        }
        let start = Instant::now();
        let body = ChatCompletionRequest::for_prompt(prompt, &self.model);

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!(
            "openai: POST {url} model={} structured={}",
            body.model, prompt.structured
        );

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| MonyError::Provider(format!("openai request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(MonyError::Provider(format!(
                "openai returned {status}: {text}"
            )));
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| MonyError::Provider(format!("openai: failed to parse response: {e}")))?;

        let content = parsed
            .content()
            .ok_or_else(|| MonyError::Provider("openai: response had no content".into()))?;

        debug!(
            "openai: {} tokens in {}ms",
            parsed
                .usage
                .as_ref()
                .and_then(|u| u.total_tokens)
                .unwrap_or_default(),
            start.elapsed().as_millis()
        );

        into_completion(content, prompt.structured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_provider_name() {
        let p = OpenAiProvider::from_config(
            "https://api.openai.com/v1".into(),
            "sk-test".into(),
            "gpt-4o-mini".into(),
        );
        assert_eq!(p.name(), "openai");
    }

    #[test]
    fn test_request_for_structured_prompt() {
        let prompt = PromptBundle::new("Subject: Debit")
            .with_system("Classify.")
            .with_assistant("{\"is_finance_email\": false}")
            .structured();
        let body = ChatCompletionRequest::for_prompt(&prompt, "gpt-4o-mini");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["response_format"]["type"], "json_object");
        let roles: Vec<&str> = json["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
    }

    #[test]
    fn test_request_for_text_prompt_omits_format() {
        let mut prompt = PromptBundle::new("hi");
        prompt.model = Some("gpt-4o".into());
        let json = serde_json::to_value(ChatCompletionRequest::for_prompt(&prompt, "x")).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn test_response_content_extraction() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"{\"category\":\"Food\"}"},"finish_reason":"stop"}],"usage":{"total_tokens":42}}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.content(), Some("{\"category\":\"Food\"}"));
        assert_eq!(resp.usage.as_ref().and_then(|u| u.total_tokens), Some(42));
    }

    #[test]
    fn test_response_without_choices() {
        let resp: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(resp.content().is_none());
    }

    #[test]
    fn test_into_completion_structured() {
        let c = into_completion(r#"{"category": "Food"}"#, true).unwrap();
        assert_eq!(c.as_json().unwrap()["category"], "Food");
    }

    #[test]
    fn test_into_completion_invalid_json_is_parse_error() {
        let err = into_completion("Food, probably", true).unwrap_err();
        assert!(matches!(err, MonyError::Parse(_)));
    }

    #[test]
    fn test_into_completion_text_passthrough() {
        assert_eq!(
            into_completion("not json", false).unwrap(),
            Completion::Text("not json".into())
        );
    }
}
