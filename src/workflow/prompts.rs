//! Completion prompts used by the workflow.

use mony_core::{
    context::PromptBundle,
    error::MonyError,
    finance::{EmailRecord, TransactionDetail, FALLBACK_CATEGORY},
};

const EXTRACTION_SYSTEM: &str = "\
You are an expert at reading HTML email content.

1. Decide whether the email is a finance transaction alert (a debit or a \
credit) sent by a legitimate source such as a bank or a UPI app. Promotional \
and marketing emails are not transaction alerts.
2. For a transaction alert, extract:
   - transaction_type: \"debit\" or \"credit\"
   - amount: numeric value only, e.g. \"1500.00\"
   - counterparty: who was paid for a debit, who paid for a credit
   - transaction_id
   - transaction_date: YYYY-MM-DD, IST
   - transaction_time: HH:MM:SS, IST, 24-hour clock
3. When the body has no date or time, use the Email Received Time.
4. Any field that is missing or unclear is the empty string \"\".
5. Always include the top-level boolean \"is_finance_email\". When it is \
false no other field is needed.";

const EXTRACTION_FORMAT: &str = r#"Respond with JSON shaped like one of these samples.

Transaction alert:
{
  "is_finance_email": true,
  "transaction_type": "debit",
  "amount": "1500.00",
  "counterparty": "Amazon",
  "transaction_id": "TXN123456789",
  "transaction_date": "2025-09-13",
  "transaction_time": "14:35:20"
}

Anything else:
{
  "is_finance_email": false
}"#;

/// Ask whether `email` is a transaction alert and pull out its fields.
pub fn extraction_prompt(email: &EmailRecord) -> PromptBundle {
    let body = if email.html_body.is_empty() {
        &email.text_body
    } else {
        &email.html_body
    };
    let user = format!(
        "Email Subject: {}\nEmail Received Time: {}\nHTML Content from Email: {body}",
        email.subject, email.date
    );
    PromptBundle::new(user)
        .with_system(EXTRACTION_SYSTEM)
        .with_assistant(EXTRACTION_FORMAT)
        .structured()
}

/// Ask the model to pick one of `categories` for a transaction.
pub fn category_prompt(
    detail: &TransactionDetail,
    categories: &[String],
) -> Result<PromptBundle, MonyError> {
    let system = format!(
        "You are a financial assistant that files transactions into predefined \
         categories. Always choose the most relevant category from the list. \
         If nothing fits, answer \"{FALLBACK_CATEGORY}\"."
    );
    let user = format!(
        "Transaction Detail:\n{}\n\nAvailable Categories:\n{}",
        serde_json::to_string_pretty(detail)?,
        serde_json::to_string(categories)?
    );
    Ok(PromptBundle::new(user)
        .with_system(system)
        .with_assistant(
            "Respond with only a JSON object in the format:\n{\"category\": \"<best matching category>\"}",
        )
        .structured())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mony_core::finance::TransactionType;

    #[test]
    fn test_extraction_prompt_prefers_html() {
        let email = EmailRecord {
            subject: "Alert".into(),
            date: "Fri, 1 Mar 2024 09:15:00 +0530".into(),
            text_body: "plain".into(),
            html_body: "<p>html</p>".into(),
            ..Default::default()
        };
        let p = extraction_prompt(&email);
        assert!(p.structured);
        assert!(p.user.contains("Email Subject: Alert"));
        assert!(p.user.contains("Email Received Time: Fri, 1 Mar 2024"));
        assert!(p.user.ends_with("<p>html</p>"));
        assert!(p.system.unwrap().contains("is_finance_email"));
    }

    #[test]
    fn test_extraction_prompt_falls_back_to_text() {
        let email = EmailRecord {
            text_body: "Rs 99 debited".into(),
            ..Default::default()
        };
        assert!(extraction_prompt(&email).user.ends_with("Rs 99 debited"));
    }

    #[test]
    fn test_category_prompt_lists_categories() {
        let detail = TransactionDetail {
            transaction_type: TransactionType::Debit,
            amount: "250".into(),
            counterparty: "Cafe".into(),
            ..Default::default()
        };
        let p = category_prompt(&detail, &["Food".into(), "Travel".into()]).unwrap();
        assert!(p.structured);
        assert!(p.user.contains("\"counterparty\": \"Cafe\""));
        assert!(p.user.contains("[\"Food\",\"Travel\"]"));
        assert!(p.system.unwrap().contains("\"Others\""));
    }
}
