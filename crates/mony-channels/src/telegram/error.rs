use mony_core::error::MonyError;
use thiserror::Error;

/// Failure of a single Bot API call.
#[derive(Debug, Error)]
pub enum ChatApiError {
    /// The client-side request timeout fired before the server answered.
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS or body-read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("http {status}: {body}")]
    Status { status: u16, body: String },

    /// HTTP 200 with `ok: false`.
    #[error("api rejected request: {0}")]
    Rejected(String),

    /// The response body did not match the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ChatApiError {
    /// Telegram's answer when Markdown/HTML markup in the text does not parse.
    pub fn is_entity_parse_failure(&self) -> bool {
        match self {
            Self::Status { body, .. } => body.contains("can't parse entities"),
            Self::Rejected(description) => description.contains("can't parse entities"),
            _ => false,
        }
    }
}

/// Misuse of the selection engine, reported before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("at least one predefined option is required")]
    NoOptions,

    #[error("buttons_per_row must be at least 1")]
    ZeroButtonsPerRow,
}

impl From<SelectionError> for MonyError {
    fn from(e: SelectionError) -> Self {
        MonyError::Validation(e.to_string())
    }
}

impl From<ChatApiError> for MonyError {
    fn from(e: ChatApiError) -> Self {
        MonyError::Channel(format!("telegram: {e}"))
    }
}
