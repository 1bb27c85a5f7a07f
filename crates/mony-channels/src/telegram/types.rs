//! Telegram Bot API wire types.

use mony_core::message::{IncomingEvent, OutgoingMessage, ReplyMarkup};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct TgResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgUpdate {
    pub update_id: i64,
    pub message: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgMessage {
    pub chat: TgChat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgChat {
    pub id: i64,
}

impl From<TgUpdate> for IncomingEvent {
    /// Non-message updates (edits, callbacks, member changes) still carry an
    /// `update_id` that has to advance the offset, so they map to an event
    /// with no chat and no text.
    fn from(update: TgUpdate) -> Self {
        match update.message {
            Some(msg) => IncomingEvent {
                update_id: update.update_id,
                chat_id: msg.chat.id.to_string(),
                text: msg.text,
            },
            None => IncomingEvent {
                update_id: update.update_id,
                chat_id: String::new(),
                text: None,
            },
        }
    }
}

/// `getUpdates` request body.
#[derive(Debug, Serialize)]
pub(crate) struct TgGetUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub limit: u32,
}

/// `sendMessage` request body.
#[derive(Debug, Serialize)]
pub(crate) struct TgSendMessage<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<TgReplyMarkup>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum TgReplyMarkup {
    Keyboard {
        keyboard: Vec<Vec<String>>,
        resize_keyboard: bool,
        one_time_keyboard: bool,
    },
    Remove {
        remove_keyboard: bool,
    },
}

impl From<&ReplyMarkup> for TgReplyMarkup {
    fn from(markup: &ReplyMarkup) -> Self {
        match markup {
            ReplyMarkup::Keyboard(layout) => Self::Keyboard {
                keyboard: layout.rows.clone(),
                resize_keyboard: layout.resize,
                one_time_keyboard: !layout.persist,
            },
            ReplyMarkup::Remove => Self::Remove {
                remove_keyboard: true,
            },
        }
    }
}

impl<'a> From<&'a OutgoingMessage> for TgSendMessage<'a> {
    fn from(message: &'a OutgoingMessage) -> Self {
        Self {
            chat_id: &message.chat_id,
            text: &message.text,
            parse_mode: message.format.as_api_str(),
            reply_markup: message.markup.as_ref().map(TgReplyMarkup::from),
        }
    }
}
