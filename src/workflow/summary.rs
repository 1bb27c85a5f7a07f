//! Markdown transaction alert shown above the category buttons.

use chrono::{NaiveDate, NaiveDateTime};
use mony_core::finance::{TransactionDetail, TransactionType};

/// `*Transaction Alert:*` message for a transaction.
pub fn transaction_alert(detail: &TransactionDetail) -> String {
    let movement = match detail.transaction_type {
        TransactionType::Credit => format!(
            "Received ₹{} from {}",
            detail.amount, detail.counterparty
        ),
        TransactionType::Debit | TransactionType::Unknown => {
            format!("Paid ₹{} to {}", detail.amount, detail.counterparty)
        }
    };

    let mut text = format!("*Transaction Alert:*\n{movement}");
    let when = format_when(&detail.transaction_date, &detail.transaction_time);
    if !when.is_empty() {
        text.push_str(&format!(" on {when}"));
    }
    if !detail.transaction_id.is_empty() {
        text.push_str(&format!(
            "\n\n_Transaction ID:_ *{}*",
            detail.transaction_id
        ));
    }
    text
}

/// "01 Mar 2024 at 09:15 AM"; date only when the time is unusable; the raw
/// text when neither parses.
pub(crate) fn format_when(date: &str, time: &str) -> String {
    let date = date.trim();
    let time = time.trim();

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&format!("{date} {time}"), fmt) {
            return dt.format("%d %b %Y at %I:%M %p").to_string();
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return d.format("%d %b %Y").to_string();
    }
    format!("{date} {time}").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(kind: TransactionType) -> TransactionDetail {
        TransactionDetail {
            transaction_type: kind,
            amount: "1500.00".into(),
            counterparty: "Amazon".into(),
            transaction_id: "TXN123".into(),
            transaction_date: "2025-09-13".into(),
            transaction_time: "14:35:20".into(),
        }
    }

    #[test]
    fn test_debit_alert() {
        assert_eq!(
            transaction_alert(&detail(TransactionType::Debit)),
            "*Transaction Alert:*\nPaid ₹1500.00 to Amazon on 13 Sep 2025 at 02:35 PM\n\n\
             _Transaction ID:_ *TXN123*"
        );
    }

    #[test]
    fn test_credit_alert() {
        let text = transaction_alert(&detail(TransactionType::Credit));
        assert!(text.contains("Received ₹1500.00 from Amazon"));
    }

    #[test]
    fn test_missing_id_and_time() {
        let mut d = detail(TransactionType::Debit);
        d.transaction_id.clear();
        d.transaction_time.clear();
        assert_eq!(
            transaction_alert(&d),
            "*Transaction Alert:*\nPaid ₹1500.00 to Amazon on 13 Sep 2025"
        );
    }

    #[test]
    fn test_format_when_variants() {
        assert_eq!(format_when("2024-03-01", "09:15"), "01 Mar 2024 at 09:15 AM");
        assert_eq!(format_when("yesterday", ""), "yesterday");
        assert_eq!(format_when("", ""), "");
    }
}
