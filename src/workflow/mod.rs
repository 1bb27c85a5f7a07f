//! Workflow: one pass over a user's inbox.
//!
//! Find the oldest unseen email, ask the model whether it is a transaction
//! alert, get a category (from the user over Telegram when possible, from the
//! model otherwise), save the transaction and log the run.

pub mod prompts;
pub mod summary;


use chrono::Utc;
use mony_channels::gmail::{GmailClient, GmailTokens};
use mony_channels::telegram::InteractiveSelectionEngine;
use mony_core::{
    config::{Config, GmailConfig},
    error::MonyError,
    finance::{
        category_from_json, EmailRecord, FinanceClassification, TransactionDetail,
        FALLBACK_CATEGORY,
    },
    message::ParseMode,
    traits::{MailSource, Provider},
};
use mony_memory::{RunStatus, Store, TransactionRecord, WorkflowRun};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Who chose the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySource {
    User,
    Model,
    /// The model's answer was unusable.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryChoice {
    pub name: String,
    pub source: CategorySource,
}

/// How one run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    NoNewMail,
    AlreadyProcessed {
        message_id: String,
    },
    NotFinance {
        message_id: String,
    },
    Recorded {
        message_id: String,
        transaction_pk: i64,
        category: CategoryChoice,
    },
    Failed {
        message_id: Option<String>,
        error: String,
    },
}

impl WorkflowOutcome {
    pub fn status(&self) -> RunStatus {
        match self {
            Self::Failed { .. } => RunStatus::Failure,
            _ => RunStatus::Success,
        }
    }
}

/// Knobs the workflow reads from config.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub query: String,
    pub fallback_lookback_hours: i64,
    pub selection_timeout: Duration,
    pub buttons_per_row: usize,
    pub parse_mode: ParseMode,
}

impl From<&Config> for WorkflowSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            query: cfg.gmail.query.clone(),
            fallback_lookback_hours: cfg.gmail.fallback_lookback_hours,
            selection_timeout: cfg.telegram.selection_timeout(),
            buttons_per_row: cfg.telegram.buttons_per_row,
            parse_mode: cfg.telegram.parse_mode,
        }
    }
}

/// What a run learned before it ended, kept for the run log even on failure.
#[derive(Default)]
struct RunProgress {
    email: Option<EmailRecord>,
    is_finance: bool,
    transaction_pk: Option<i64>,
}

/// The pipeline, shared by every user's run.
pub struct Workflow {
    provider: Arc<dyn Provider>,
    store: Store,
    engine: Option<Arc<InteractiveSelectionEngine>>,
    settings: WorkflowSettings,
}

impl Workflow {
    pub fn new(
        provider: Arc<dyn Provider>,
        store: Store,
        engine: Option<Arc<InteractiveSelectionEngine>>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            provider,
            store,
            engine,
            settings,
        }
    }

    /// Run once for `user_id` against their Gmail inbox, persisting the
    /// access token if it was refreshed along the way.
    pub async fn run_gmail(
        &self,
        user_id: &str,
        gmail: &GmailConfig,
    ) -> Result<WorkflowOutcome, MonyError> {
        let (access_token, refresh_token) =
            self.store.google_tokens(user_id).await?.ok_or_else(|| {
                MonyError::Config(format!("user {user_id} has no Google tokens stored"))
            })?;
        let client = GmailClient::new(
            gmail,
            GmailTokens {
                access_token: access_token.clone(),
                refresh_token,
            },
        );

        let outcome = self.run(user_id, &client).await;

        let current = client.tokens().await;
        if current.access_token != access_token {
            self.store
                .update_access_token(user_id, &current.access_token)
                .await?;
            info!("[{user_id}] stored refreshed Google access token");
        }
        Ok(outcome)
    }

    /// Run once for `user_id` against `mail`, then log the run if an email
    /// was looked at.
    pub async fn run(&self, user_id: &str, mail: &dyn MailSource) -> WorkflowOutcome {
        let run_start = Utc::now().timestamp();
        let mut progress = RunProgress::default();

        let outcome = match self.process(user_id, mail, &mut progress).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("[{user_id}] workflow failed: {e}");
                WorkflowOutcome::Failed {
                    message_id: progress.email.as_ref().map(|m| m.message_id.clone()),
                    error: e.to_string(),
                }
            }
        };

        if let Some(email) = &progress.email {
            let run = WorkflowRun {
                user_id: user_id.to_string(),
                user_transaction_id: progress.transaction_pk,
                run_start,
                run_end: Utc::now().timestamp(),
                email_message_id: email.message_id.clone(),
                email_subject: email.subject.clone(),
                is_finance_email: progress.is_finance,
                run_status: outcome.status(),
                error_message: match &outcome {
                    WorkflowOutcome::Failed { error, .. } => Some(error.clone()),
                    _ => None,
                },
            };
            if let Err(e) = self.store.log_workflow_run(&run).await {
                error!("[{user_id}] failed to log workflow run: {e}");
            }
        }

        outcome
    }

    async fn process(
        &self,
        user_id: &str,
        mail: &dyn MailSource,
        progress: &mut RunProgress,
    ) -> Result<WorkflowOutcome, MonyError> {
        let after = self.last_email_epoch(user_id).await?;
        let Some(email) = mail
            .first_message_after(&self.settings.query, after)
            .await?
        else {
            info!("[{user_id}] no new mail after {after}");
            return Ok(WorkflowOutcome::NoNewMail);
        };
        let message_id = email.message_id.clone();
        info!(
            "[{user_id}] processing {message_id} from {}: {}",
            mail.name(),
            email.subject
        );
        progress.email = Some(email.clone());

        if self.store.is_message_processed(user_id, &message_id).await? {
            info!("[{user_id}] {message_id} already processed, skipping");
            return Ok(WorkflowOutcome::AlreadyProcessed { message_id });
        }

        let completion = self
            .provider
            .complete(&prompts::extraction_prompt(&email))
            .await?;
        let json = completion
            .as_json()
            .ok_or_else(|| MonyError::Parse("classification was not JSON".into()))?;
        let detail = match FinanceClassification::from_json(json)? {
            FinanceClassification::NotFinance => {
                info!("[{user_id}] {message_id} is not a finance email");
                return Ok(WorkflowOutcome::NotFinance { message_id });
            }
            FinanceClassification::Finance(detail) => detail,
        };
        progress.is_finance = true;

        let category = self.choose_category(user_id, &detail).await?;
        info!(
            "[{user_id}] category for {message_id}: {} ({:?})",
            category.name, category.source
        );

        let transaction_id = if detail.transaction_id.is_empty() {
            warn!("[{user_id}] {message_id} has no transaction id, keying by message id");
            message_id.clone()
        } else {
            detail.transaction_id.clone()
        };
        let record = TransactionRecord {
            user_id: user_id.to_string(),
            transaction_id,
            transaction_type: detail.transaction_type.as_str().to_string(),
            amount: detail.amount,
            counterparty: detail.counterparty,
            transaction_date: detail.transaction_date,
            transaction_time: detail.transaction_time,
            category: category.name.clone(),
            email_message_id: message_id.clone(),
        };
        let transaction_pk = self.store.upsert_transaction(&record).await?;
        progress.transaction_pk = Some(transaction_pk);

        Ok(WorkflowOutcome::Recorded {
            message_id,
            transaction_pk,
            category,
        })
    }

    /// Start of the user's last run, or the fallback look-back window.
    async fn last_email_epoch(&self, user_id: &str) -> Result<i64, MonyError> {
        Ok(match self.store.last_run_start(user_id).await? {
            Some(start) => start,
            None => Utc::now().timestamp() - self.settings.fallback_lookback_hours * 3600,
        })
    }

    /// Ask the user over Telegram when a chat is linked and there are
    /// categories to offer; otherwise, or without an answer, ask the model.
    async fn choose_category(
        &self,
        user_id: &str,
        detail: &TransactionDetail,
    ) -> Result<CategoryChoice, MonyError> {
        let categories = self.store.active_categories(user_id).await?;

        match (&self.engine, self.store.telegram_chat_id(user_id).await?) {
            (Some(engine), Some(chat_id)) if !categories.is_empty() => {
                let answer = engine
                    .ask_selection_or_custom(
                        &chat_id,
                        &summary::transaction_alert(detail),
                        &categories,
                        self.settings.selection_timeout,
                        self.settings.buttons_per_row,
                        self.settings.parse_mode,
                    )
                    .await;
                match answer {
                    Ok(Some(selection)) => {
                        return Ok(CategoryChoice {
                            name: selection.into_value(),
                            source: CategorySource::User,
                        })
                    }
                    Ok(None) => info!("[{user_id}] no category from telegram"),
                    Err(e) => warn!("[{user_id}] telegram selection rejected: {e}"),
                }
            }
            (Some(_), Some(_)) => info!("[{user_id}] no active categories to offer"),
            (None, Some(_)) => info!("[{user_id}] telegram not configured"),
            (_, None) => info!("[{user_id}] telegram not linked"),
        }

        self.category_from_model(user_id, detail, &categories).await
    }

    async fn category_from_model(
        &self,
        user_id: &str,
        detail: &TransactionDetail,
        categories: &[String],
    ) -> Result<CategoryChoice, MonyError> {
        let prompt = prompts::category_prompt(detail, categories)?;
        let completion = self.provider.complete(&prompt).await?;
        let decoded = completion
            .as_json()
            .ok_or_else(|| MonyError::Parse("category answer was not JSON".into()))
            .and_then(category_from_json);
        Ok(match decoded {
            Ok(name) => CategoryChoice {
                name,
                source: CategorySource::Model,
            },
            Err(e) => {
                warn!("[{user_id}] unusable category answer ({e}), using {FALLBACK_CATEGORY}");
                CategoryChoice {
                    name: FALLBACK_CATEGORY.to_string(),
                    source: CategorySource::Fallback,
                }
            }
        })
    }
}
