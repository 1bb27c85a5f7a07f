//! Turning Gmail's MIME tree into an [`EmailRecord`].

use super::types::{GmMessage, GmPart};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use mony_core::finance::EmailRecord;

/// Flatten a full-format message. Missing headers get placeholder values.
pub(crate) fn to_record(message: GmMessage) -> EmailRecord {
    let internal_date = internal_date_secs(&message);
    let payload = message.payload.unwrap_or_default();

    let header = |name: &str, fallback: &str| {
        payload
            .headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.clone())
            .unwrap_or_else(|| fallback.to_string())
    };

    let (text_body, html_body) = extract_bodies(&payload);

    EmailRecord {
        message_id: message.id.clone(),
        subject: header("Subject", "No Subject"),
        from: header("From", "Unknown"),
        date: header("Date", "Unknown"),
        text_body,
        html_body,
        internal_date,
    }
}

/// `internalDate` in whole seconds; 0 when absent or unparsable.
pub(crate) fn internal_date_secs(message: &GmMessage) -> i64 {
    message
        .internal_date
        .as_deref()
        .and_then(|ms| ms.parse::<i64>().ok())
        .map_or(0, |ms| ms / 1000)
}

/// First `text/plain` and first `text/html` bodies, searching nested
/// multiparts depth-first.
pub(crate) fn extract_bodies(part: &GmPart) -> (String, String) {
    let mut text = String::new();
    let mut html = String::new();

    match &part.parts {
        Some(children) => {
            for child in children {
                take_body(child, &mut text, &mut html);
                if child.parts.is_some() {
                    let (nested_text, nested_html) = extract_bodies(child);
                    if text.is_empty() {
                        text = nested_text;
                    }
                    if html.is_empty() {
                        html = nested_html;
                    }
                }
            }
        }
        None => take_body(part, &mut text, &mut html),
    }

    (text, html)
}

fn take_body(part: &GmPart, text: &mut String, html: &mut String) {
    let data = part.body.as_ref().and_then(|b| b.data.as_deref());
    match part.mime_type.as_str() {
        "text/plain" => *text = decode_data(data),
        "text/html" => *html = decode_data(data),
        _ => {}
    }
}

/// Gmail bodies are base64url, with or without padding.
pub(crate) fn decode_data(data: Option<&str>) -> String {
    let Some(data) = data else {
        return String::new();
    };
    match URL_SAFE_NO_PAD.decode(data.trim_end_matches('=')) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}
