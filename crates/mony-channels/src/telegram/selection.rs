//! The ask-and-wait state machine.
//!
//! Pure: given the interaction's mode and one event it decides what the
//! engine should do next. All I/O stays in the engine.

use super::offset::OffsetTracker;
use mony_core::message::{IncomingEvent, SelectionResult, CUSTOM_ANSWER_LABEL};
use tokio::time::Instant;

/// Where a selection interaction stands. Only ever moves
/// `Awaiting` -> `CustomInput`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Buttons are shown; a tap or any typed text resolves.
    #[default]
    Awaiting,
    /// The user asked to type their own answer; the next text other than
    /// the escape resolves.
    CustomInput,
}

/// Mutable state owned by exactly one in-flight interaction.
#[derive(Debug)]
pub struct PollState {
    pub offsets: OffsetTracker,
    pub deadline: Instant,
    pub mode: Mode,
}

impl PollState {
    pub fn new(offsets: OffsetTracker, deadline: Instant) -> Self {
        Self {
            offsets,
            deadline,
            mode: Mode::Awaiting,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// A message the engine should send back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Clear the reply keyboard along with this message.
    pub remove_keyboard: bool,
}

impl Reply {
    fn new(text: String, remove_keyboard: bool) -> Self {
        Self {
            text,
            remove_keyboard,
        }
    }
}

/// Outcome of evaluating one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Not for us, or nothing to act on.
    Ignored,
    /// Non-terminal: send the reply and keep polling.
    Continue(Reply),
    /// Terminal: the interaction has its answer.
    Resolved {
        result: SelectionResult,
        reply: Option<Reply>,
    },
}

/// Rules for one selection prompt: which chat to listen to and which
/// button labels count as predefined answers.
#[derive(Debug, Clone, Copy)]
pub struct SelectionStateMachine<'a> {
    chat_id: &'a str,
    options: &'a [String],
}

impl<'a> SelectionStateMachine<'a> {
    pub fn new(chat_id: &'a str, options: &'a [String]) -> Self {
        Self { chat_id, options }
    }

    /// Evaluate one event against the current mode, updating it in place.
    pub fn evaluate(&self, mode: &mut Mode, event: &IncomingEvent) -> Step {
        let Some(text) = event_text(self.chat_id, event) else {
            return Step::Ignored;
        };

        let current = *mode;
        match current {
            // The escape never resolves; tapping it again just re-prompts.
            _ if text == CUSTOM_ANSWER_LABEL => {
                *mode = Mode::CustomInput;
                Step::Continue(Reply::new(
                    "✏️ Please type your custom answer:".to_string(),
                    true,
                ))
            }
            Mode::CustomInput => Step::Resolved {
                reply: Some(Reply::new(
                    format!("✅ Got your custom answer: {text}"),
                    false,
                )),
                result: SelectionResult::Custom(text.to_string()),
            },
            Mode::Awaiting if self.options.iter().any(|o| o == text) => Step::Resolved {
                reply: Some(Reply::new(format!("✅ You selected: {text}"), true)),
                result: SelectionResult::Predefined(text.to_string()),
            },
            // Typed text that is neither a button nor the escape is taken
            // as a custom answer directly.
            Mode::Awaiting => Step::Resolved {
                reply: Some(Reply::new(
                    format!("✅ Got your custom input: {text}"),
                    true,
                )),
                result: SelectionResult::Custom(text.to_string()),
            },
        }
    }
}

/// Free-text rules: the first text from the chat resolves, silently.
pub(crate) fn evaluate_free_text(chat_id: &str, event: &IncomingEvent) -> Step {
    match event_text(chat_id, event) {
        Some(text) => Step::Resolved {
            result: SelectionResult::Custom(text.to_string()),
            reply: None,
        },
        None => Step::Ignored,
    }
}

/// Trimmed, non-empty text of an event posted in `chat_id`.
fn event_text<'e>(chat_id: &str, event: &'e IncomingEvent) -> Option<&'e str> {
    if event.chat_id != chat_id {
        return None;
    }
    event
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
