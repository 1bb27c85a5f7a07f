//! Interactive selection over long polling.
//!
//! An interaction is: prime the offset, send the prompt, then poll until the
//! state machine resolves or the deadline passes. Each interaction owns its
//! [`PollState`]; the only thing engines share is the [`RateGate`].
//!
//! Telegram serves `getUpdates` to one consumer per bot token, and advancing
//! the offset confirms updates for every chat. One engine therefore runs one
//! interaction at a time; concurrent asks wait their turn.

use super::error::SelectionError;
use super::fetch::{FetchOutcome, UpdateFetcher};
use super::offset::OffsetTracker;
use super::rate::RateGate;
use super::selection::{evaluate_free_text, Mode, PollState, Reply, SelectionStateMachine, Step};
use super::sender::MessageSender;
use super::{BotApi, TelegramClient};
use mony_core::config::TelegramConfig;
use mony_core::message::{
    IncomingEvent, KeyboardLayout, OutgoingMessage, ParseMode, ReplyMarkup, SelectionResult,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

const PROMPT_SUFFIX: &str = "Choose from buttons below OR type your own answer:";
const TIMEOUT_NOTICE: &str = "⏰ Selection timeout.";

/// Polling knobs.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// Server-side hold per `getUpdates` call.
    pub poll_timeout: Duration,
    /// Pause after a failed poll.
    pub fetch_backoff: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(2),
            fetch_backoff: Duration::from_secs(1),
        }
    }
}

impl From<&TelegramConfig> for EngineSettings {
    fn from(config: &TelegramConfig) -> Self {
        Self {
            poll_timeout: config.poll_timeout(),
            fetch_backoff: config.fetch_backoff(),
        }
    }
}

/// Asks a user a question in a chat and waits for the answer.
pub struct InteractiveSelectionEngine {
    fetcher: UpdateFetcher,
    sender: MessageSender,
    settings: EngineSettings,
    /// Held from priming to resolution.
    interaction: Mutex<()>,
}

impl InteractiveSelectionEngine {
    pub fn new(api: Arc<dyn BotApi>, gate: Arc<RateGate>, settings: EngineSettings) -> Self {
        Self {
            fetcher: UpdateFetcher::new(api.clone(), gate.clone()),
            sender: MessageSender::new(api, gate),
            settings,
            interaction: Mutex::new(()),
        }
    }

    /// An engine talking to the real Bot API.
    pub fn from_config(config: &TelegramConfig, gate: Arc<RateGate>) -> Self {
        let api: Arc<dyn BotApi> = Arc::new(TelegramClient::new(config));
        Self::new(api, gate, EngineSettings::from(config))
    }

    /// Show `options` as buttons plus a "type my own answer" row and wait for
    /// a tap or typed text.
    ///
    /// Returns `Ok(None)` on timeout, or when the prompt itself could not be
    /// delivered. Invalid arguments fail before anything is sent. The timeout
    /// starts once any other interaction on this engine has finished.
    pub async fn ask_selection_or_custom(
        &self,
        chat_id: &str,
        prompt: &str,
        options: &[String],
        timeout: Duration,
        buttons_per_row: usize,
        format: ParseMode,
    ) -> Result<Option<SelectionResult>, SelectionError> {
        if options.is_empty() {
            return Err(SelectionError::NoOptions);
        }
        if buttons_per_row == 0 {
            return Err(SelectionError::ZeroButtonsPerRow);
        }

        let _turn = self.take_turn(chat_id).await;
        let mut state = self.begin(timeout).await;

        let keyboard = KeyboardLayout::with_custom_entry(options, buttons_per_row);
        let message = OutgoingMessage::text(chat_id, format!("{prompt}\n\n{PROMPT_SUFFIX}"))
            .with_format(format)
            .with_markup(ReplyMarkup::Keyboard(keyboard));
        if self.sender.send(message).await.is_err() {
            warn!("telegram selection prompt to {chat_id} not delivered, giving up");
            return Ok(None);
        }

        Ok(self.poll_selection(chat_id, options, &mut state).await)
    }

    /// Wait for any text from `chat_id`, optionally sending `prompt` first
    /// (which also clears any reply keyboard). `None` on timeout.
    pub async fn ask_free_text(
        &self,
        chat_id: &str,
        prompt: Option<&str>,
        timeout: Duration,
    ) -> Option<String> {
        let _turn = self.take_turn(chat_id).await;
        let mut state = self.begin(timeout).await;

        if let Some(prompt) = prompt {
            let message = OutgoingMessage::text(chat_id, prompt).with_markup(ReplyMarkup::Remove);
            // Text may still arrive even if the prompt failed; keep waiting.
            let _ = self.sender.send(message).await;
        }

        self.poll_until(chat_id, &mut state, |_, event| {
            evaluate_free_text(chat_id, event)
        })
        .await
        .map(SelectionResult::into_value)
    }

    async fn take_turn(&self, chat_id: &str) -> tokio::sync::MutexGuard<'_, ()> {
        match self.interaction.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("telegram {chat_id} waiting for the running interaction");
                self.interaction.lock().await
            }
        }
    }

    /// Start an interaction: fix the deadline and prime the offset.
    pub(crate) async fn begin(&self, timeout: Duration) -> PollState {
        let deadline = Instant::now() + timeout;
        let offsets = OffsetTracker::prime(&self.fetcher).await;
        PollState::new(offsets, deadline)
    }

    /// Poll with the selection rules; on timeout, tell the user and clear
    /// the keyboard.
    pub(crate) async fn poll_selection(
        &self,
        chat_id: &str,
        options: &[String],
        state: &mut PollState,
    ) -> Option<SelectionResult> {
        let machine = SelectionStateMachine::new(chat_id, options);
        let result = self
            .poll_until(chat_id, state, |mode, event| machine.evaluate(mode, event))
            .await;

        match &result {
            Some(r) => info!("telegram selection in {chat_id} resolved: {r:?}"),
            None => {
                info!("telegram selection in {chat_id} timed out");
                let notice =
                    OutgoingMessage::text(chat_id, TIMEOUT_NOTICE).with_markup(ReplyMarkup::Remove);
                let _ = self.sender.send(notice).await;
            }
        }
        result
    }

    /// The fetch/interpret loop shared by both operations.
    ///
    /// The deadline is checked before every fetch. Each batch advances the
    /// offset over every event in it, then events are evaluated in order
    /// until one resolves.
    async fn poll_until<F>(
        &self,
        chat_id: &str,
        state: &mut PollState,
        mut evaluate: F,
    ) -> Option<SelectionResult>
    where
        F: FnMut(&mut Mode, &IncomingEvent) -> Step,
    {
        loop {
            if state.is_expired() {
                return None;
            }

            let remaining = state.deadline.saturating_duration_since(Instant::now());
            let hold = self
                .settings
                .poll_timeout
                .as_secs()
                .max(1)
                .min(remaining.as_secs().max(1));

            let batch = match self.fetcher.fetch(state.offsets.next(), hold).await {
                FetchOutcome::Batch(batch) => batch,
                FetchOutcome::Failed(_) => {
                    debug!(
                        "telegram backing off {:?} after failed poll",
                        self.settings.fetch_backoff
                    );
                    tokio::time::sleep(self.settings.fetch_backoff).await;
                    continue;
                }
            };

            for event in state.offsets.admit(batch) {
                match evaluate(&mut state.mode, &event) {
                    Step::Ignored => {}
                    Step::Continue(reply) => {
                        debug!("telegram {chat_id} switched to {:?}", state.mode);
                        self.reply(chat_id, reply).await;
                    }
                    Step::Resolved { result, reply } => {
                        if let Some(reply) = reply {
                            self.reply(chat_id, reply).await;
                        }
                        return Some(result);
                    }
                }
            }
        }
    }

    /// Send an acknowledgment; failure does not change the outcome.
    async fn reply(&self, chat_id: &str, reply: Reply) {
        let mut message = OutgoingMessage::text(chat_id, reply.text);
        if reply.remove_keyboard {
            message = message.with_markup(ReplyMarkup::Remove);
        }
        let _ = self.sender.send(message).await;
    }
}
