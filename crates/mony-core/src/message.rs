use serde::{Deserialize, Serialize};

/// Button label that switches an interaction into free-text mode.
///
/// Matched exactly against incoming text, so it must never change once
/// keyboards carrying it are live.
pub const CUSTOM_ANSWER_LABEL: &str = "✏️ Type my own answer";

/// An incoming chat event, as delivered by the long-poll API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingEvent {
    /// Monotonic delivery id assigned by the chat server.
    pub update_id: i64,
    /// Chat the event was posted in.
    pub chat_id: String,
    /// Message text, absent for stickers, photos, joins and the like.
    pub text: Option<String>,
}

/// Rich-text mode passed through to the chat API.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    #[default]
    None,
    Html,
    Markdown,
}

impl ParseMode {
    /// Wire value for the `parse_mode` field, `None` when unformatted.
    pub fn as_api_str(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Html => Some("HTML"),
            Self::Markdown => Some("Markdown"),
        }
    }
}

/// A reply keyboard: rows of button labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardLayout {
    pub rows: Vec<Vec<String>>,
    /// Let the client shrink the keyboard to fit its buttons.
    pub resize: bool,
    /// Keep the keyboard visible after a tap so typed input stays possible.
    pub persist: bool,
}

impl KeyboardLayout {
    /// Lay `options` out `per_row` at a time and append the custom-answer row.
    ///
    /// `per_row` of zero is treated as one button per row.
    pub fn with_custom_entry(options: &[String], per_row: usize) -> Self {
        let mut rows: Vec<Vec<String>> = options
            .chunks(per_row.max(1))
            .map(|chunk| chunk.to_vec())
            .collect();
        rows.push(vec![CUSTOM_ANSWER_LABEL.to_string()]);
        Self {
            rows,
            resize: true,
            persist: true,
        }
    }
}

/// Markup attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyMarkup {
    Keyboard(KeyboardLayout),
    /// Clear any reply keyboard currently shown.
    Remove,
}

/// An outgoing chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub chat_id: String,
    pub text: String,
    #[serde(default)]
    pub format: ParseMode,
    #[serde(default)]
    pub markup: Option<ReplyMarkup>,
}

impl OutgoingMessage {
    /// Plain text with no markup.
    pub fn text(chat_id: &str, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.to_string(),
            text: text.into(),
            format: ParseMode::None,
            markup: None,
        }
    }

    pub fn with_format(mut self, format: ParseMode) -> Self {
        self.format = format;
        self
    }

    pub fn with_markup(mut self, markup: ReplyMarkup) -> Self {
        self.markup = Some(markup);
        self
    }
}

/// How the user answered a selection prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SelectionResult {
    /// One of the offered buttons.
    Predefined(String),
    /// Free text, either typed directly or after choosing the custom-answer button.
    Custom(String),
}

impl SelectionResult {
    pub fn value(&self) -> &str {
        match self {
            Self::Predefined(v) | Self::Custom(v) => v,
        }
    }

    pub fn into_value(self) -> String {
        match self {
            Self::Predefined(v) | Self::Custom(v) => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_keyboard_rows_fill_then_trail_custom_row() {
        let kb = KeyboardLayout::with_custom_entry(&opts(&["Food", "Rent", "Fuel"]), 2);
        assert_eq!(
            kb.rows,
            vec![
                opts(&["Food", "Rent"]),
                opts(&["Fuel"]),
                opts(&[CUSTOM_ANSWER_LABEL]),
            ]
        );
        assert!(kb.resize);
        assert!(kb.persist);
    }

    #[test]
    fn test_keyboard_exact_multiple_has_no_empty_row() {
        let kb = KeyboardLayout::with_custom_entry(&opts(&["A", "B", "C", "D"]), 2);
        assert_eq!(kb.rows.len(), 3);
        assert!(kb.rows.iter().all(|r| !r.is_empty()));
    }

    #[test]
    fn test_keyboard_zero_per_row_falls_back_to_one() {
        let kb = KeyboardLayout::with_custom_entry(&opts(&["A", "B"]), 0);
        assert_eq!(kb.rows.len(), 3);
    }

    #[test]
    fn test_parse_mode_wire_values() {
        assert_eq!(ParseMode::None.as_api_str(), None);
        assert_eq!(ParseMode::Html.as_api_str(), Some("HTML"));
        assert_eq!(ParseMode::Markdown.as_api_str(), Some("Markdown"));
    }

    #[test]
    fn test_selection_result_serializes_tagged() {
        let json = serde_json::to_value(SelectionResult::Custom("Pizza".into())).unwrap();
        assert_eq!(json["type"], "custom");
        assert_eq!(json["value"], "Pizza");
    }
}
