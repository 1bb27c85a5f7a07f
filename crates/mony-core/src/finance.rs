//! Finance domain types and the schema step that turns model JSON into them.
//!
//! The extraction prompt asks for a flat JSON object. Everything the model
//! returns goes through [`FinanceClassification::from_json`] or
//! [`category_from_json`] before the pipeline looks at it, so a malformed
//! answer surfaces as [`MonyError::Schema`] naming the offending field.

use crate::error::MonyError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Category used when neither the user nor the model picks one.
pub const FALLBACK_CATEGORY: &str = "Others";

/// Categories every newly linked user starts with.
pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "Food & Dining",
    "Transportation",
    "Shopping & Lifestyle",
    "Bills & Utilities",
    "Healthcare & Wellness",
    FALLBACK_CATEGORY,
];

/// One message pulled from the inbox.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    pub message_id: String,
    pub subject: String,
    pub from: String,
    /// Raw `Date` header.
    pub date: String,
    pub text_body: String,
    pub html_body: String,
    /// Server receive time, seconds since the Unix epoch.
    pub internal_date: i64,
}

/// Direction of money movement.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Debit,
    Credit,
    /// The model could not tell.
    #[default]
    Unknown,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
            Self::Unknown => "",
        }
    }
}

/// Transaction fields extracted from a finance alert. Unknown fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub transaction_type: TransactionType,
    /// Numeric amount as text, e.g. "1500.00".
    pub amount: String,
    /// Payee for debits, payer for credits.
    pub counterparty: String,
    pub transaction_id: String,
    /// `YYYY-MM-DD`.
    pub transaction_date: String,
    /// `HH:MM:SS`, 24-hour clock.
    pub transaction_time: String,
}

/// Result of asking the model whether an email is a transaction alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinanceClassification {
    NotFinance,
    Finance(TransactionDetail),
}

impl FinanceClassification {
    /// Decode the extraction prompt's JSON answer.
    pub fn from_json(value: &Value) -> Result<Self, MonyError> {
        let obj = value
            .as_object()
            .ok_or_else(|| MonyError::schema("$", "expected a JSON object"))?;

        let is_finance = match obj.get("is_finance_email") {
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(MonyError::schema(
                    "is_finance_email",
                    format!("expected boolean, got {other}"),
                ))
            }
            None => return Err(MonyError::schema("is_finance_email", "is missing")),
        };

        if !is_finance {
            return Ok(Self::NotFinance);
        }

        let transaction_type = match string_field(obj, "transaction_type")?
            .to_ascii_lowercase()
            .as_str()
        {
            "debit" => TransactionType::Debit,
            "credit" => TransactionType::Credit,
            "" => TransactionType::Unknown,
            other => {
                return Err(MonyError::schema(
                    "transaction_type",
                    format!("expected \"debit\" or \"credit\", got \"{other}\""),
                ))
            }
        };

        Ok(Self::Finance(TransactionDetail {
            transaction_type,
            amount: amount_field(obj)?,
            counterparty: string_field(obj, "counterparty")?,
            transaction_id: string_field(obj, "transaction_id")?,
            transaction_date: string_field(obj, "transaction_date")?,
            transaction_time: string_field(obj, "transaction_time")?,
        }))
    }

    pub fn is_finance(&self) -> bool {
        matches!(self, Self::Finance(_))
    }
}

/// Decode the categorization prompt's `{"category": ...}` answer.
pub fn category_from_json(value: &Value) -> Result<String, MonyError> {
    let obj = value
        .as_object()
        .ok_or_else(|| MonyError::schema("$", "expected a JSON object"))?;
    match obj.get("category") {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(MonyError::schema("category", "is empty")),
        Some(other) => Err(MonyError::schema(
            "category",
            format!("expected string, got {other}"),
        )),
        None => Err(MonyError::schema("category", "is missing")),
    }
}

/// A string field; missing or null decodes to empty.
fn string_field(obj: &Map<String, Value>, field: &str) -> Result<String, MonyError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(other) => Err(MonyError::schema(
            field,
            format!("expected string, got {other}"),
        )),
    }
}

/// Models regularly emit the amount as a bare number.
fn amount_field(obj: &Map<String, Value>) -> Result<String, MonyError> {
    match obj.get("amount") {
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => string_field(obj, "amount"),
    }
}
