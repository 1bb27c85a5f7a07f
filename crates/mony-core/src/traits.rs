use crate::{
    context::{Completion, PromptBundle},
    error::MonyError,
    finance::EmailRecord,
};
use async_trait::async_trait;

/// Completion provider trait: the classifier.
///
/// Every LLM backend implements this trait so the pipeline can ask for either
/// free text or a JSON object without caring who answers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Run one completion.
    ///
    /// When `prompt.structured` is set the result is [`Completion::Json`], or
    /// [`MonyError::Parse`] if the model's content was not valid JSON.
    async fn complete(&self, prompt: &PromptBundle) -> Result<Completion, MonyError>;
}

/// Mail source trait: the inbox.
#[async_trait]
pub trait MailSource: Send + Sync {
    /// Human-readable source name.
    fn name(&self) -> &str;

    /// The oldest message matching `query` received strictly after `after_epoch`
    /// (seconds since the Unix epoch), if any.
    async fn first_message_after(
        &self,
        query: &str,
        after_epoch: i64,
    ) -> Result<Option<EmailRecord>, MonyError>;
}
