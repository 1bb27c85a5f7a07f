use serde::{Deserialize, Serialize};

/// A single-shot prompt passed to a completion provider.
///
/// Mirrors the three-role layout the extraction prompts use: an optional
/// system instruction, the user payload, and an optional assistant turn that
/// pins the response format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant: Option<String>,
    /// Ask the provider for a JSON object instead of free text.
    #[serde(default)]
    pub structured: bool,
    /// Override the provider's default model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// A structured message for chat-completion APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// "system", "user" or "assistant".
    pub role: String,
    pub content: String,
}

/// What a provider produced for a [`PromptBundle`].
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Text(String),
    Json(serde_json::Value),
}

impl Completion {
    /// Borrow the JSON payload, if the completion was structured.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Text(_) => None,
        }
    }
}

impl PromptBundle {
    /// A free-text prompt with only a user turn.
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Default::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_assistant(mut self, assistant: impl Into<String>) -> Self {
        self.assistant = Some(assistant.into());
        self
    }

    /// Request a JSON object response.
    pub fn structured(mut self) -> Self {
        self.structured = true;
        self
    }

    /// Messages in API order: system, user, assistant. Empty turns are dropped.
    pub fn to_api_messages(&self) -> Vec<ApiMessage> {
        let mut messages = Vec::with_capacity(3);
        if let Some(system) = self.system.as_deref().filter(|s| !s.is_empty()) {
            messages.push(ApiMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ApiMessage {
            role: "user".to_string(),
            content: self.user.clone(),
        });
        if let Some(assistant) = self.assistant.as_deref().filter(|s| !s.is_empty()) {
            messages.push(ApiMessage {
                role: "assistant".to_string(),
                content: assistant.to_string(),
            });
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_api_messages_user_only() {
        let messages = PromptBundle::new("hello").to_api_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[0].content, "hello");
    }

    #[test]
    fn test_to_api_messages_full_order() {
        let bundle = PromptBundle::new("Email body")
            .with_system("Classify.")
            .with_assistant("Respond in JSON.")
            .structured();
        let messages = bundle.to_api_messages();
        let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
        assert!(bundle.structured);
    }

    #[test]
    fn test_to_api_messages_skips_empty_system() {
        let messages = PromptBundle::new("hi").with_system("").to_api_messages();
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_completion_as_json() {
        assert!(Completion::Text("x".into()).as_json().is_none());
        let c = Completion::Json(serde_json::json!({"a": 1}));
        assert_eq!(c.as_json().unwrap()["a"], 1);
    }
}
