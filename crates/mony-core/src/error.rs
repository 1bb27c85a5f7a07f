use thiserror::Error;

/// Top-level error type for Mony.
#[derive(Debug, Error)]
pub enum MonyError {
    /// Error from a completion provider.
    #[error("provider error: {0}")]
    Provider(String),

    /// Error from the chat channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Error from the mail source.
    #[error("mail error: {0}")]
    Mail(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Storage error.
    #[error("memory error: {0}")]
    Memory(String),

    /// Structured output was requested but the content was not valid JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// Structured output was valid JSON but did not match the expected shape.
    #[error("schema error: field `{field}` {reason}")]
    Schema { field: String, reason: String },

    /// Caller misuse, rejected before any I/O.
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MonyError {
    /// Shorthand for a schema error on `field`.
    pub fn schema(field: &str, reason: impl Into<String>) -> Self {
        Self::Schema {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
