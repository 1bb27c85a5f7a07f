//! Gmail inbox source.
//!
//! Lists messages matching a search query, fetches each in full format and
//! returns the oldest one newer than a cutoff. An expired access token is
//! refreshed once per request with the stored refresh token.
//! Docs: <https://developers.google.com/gmail/api/reference/rest>

mod parse;
pub(crate) mod types;


use async_trait::async_trait;
use mony_core::config::GmailConfig;
use mony_core::error::MonyError;
use mony_core::finance::EmailRecord;
use mony_core::traits::MailSource;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use types::{GmListResponse, GmMessage, GmTokenResponse};

/// How many candidates one listing considers.
pub const LIST_PAGE_SIZE: u32 = 50;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One user's OAuth tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GmailTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// HTTP client for one user's mailbox.
pub struct GmailClient {
    client: reqwest::Client,
    api_base: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    tokens: Mutex<GmailTokens>,
}

impl GmailClient {
    pub fn new(config: &GmailConfig, tokens: GmailTokens) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            tokens: Mutex::new(tokens),
        }
    }

    /// Tokens as they stand now, including any refresh made by this client.
    pub async fn tokens(&self) -> GmailTokens {
        self.tokens.lock().await.clone()
    }

    /// Ids of messages matching `query`, newest first as Gmail returns them.
    async fn list_ids(&self, query: &str) -> Result<Vec<String>, MonyError> {
        let url = format!("{}/users/me/messages", self.api_base);
        let params = [
            ("q", query.to_string()),
            ("maxResults", LIST_PAGE_SIZE.to_string()),
        ];
        let list: GmListResponse = self.get_json(&url, &params).await?;
        Ok(list.messages.into_iter().map(|m| m.id).collect())
    }

    async fn get_message(&self, id: &str) -> Result<GmMessage, MonyError> {
        let url = format!("{}/users/me/messages/{id}", self.api_base);
        self.get_json(&url, &[("format", "full".to_string())]).await
    }

    /// Authorized GET, refreshing the access token once on 401.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, MonyError> {
        let mut refreshed = false;
        loop {
            let token = self.tokens.lock().await.access_token.clone();
            let resp = self
                .client
                .get(url)
                .bearer_auth(&token)
                .query(params)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await
                .map_err(|e| MonyError::Mail(format!("gmail request failed: {e}")))?;

            let status = resp.status();
            if status == reqwest::StatusCode::UNAUTHORIZED && !refreshed {
                debug!("gmail access token rejected, refreshing");
                self.refresh_access_token().await?;
                refreshed = true;
                continue;
            }

            let text = resp
                .text()
                .await
                .map_err(|e| MonyError::Mail(format!("gmail read failed: {e}")))?;
            if !status.is_success() {
                return Err(MonyError::Mail(format!("gmail returned {status}: {text}")));
            }
            return serde_json::from_str(&text)
                .map_err(|e| MonyError::Mail(format!("gmail response parse failed: {e}")));
        }
    }

    async fn refresh_access_token(&self) -> Result<(), MonyError> {
        let mut tokens = self.tokens.lock().await;
        if tokens.refresh_token.is_empty() {
            return Err(MonyError::Mail(
                "gmail access token expired and no refresh token is stored".into(),
            ));
        }

        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", tokens.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let resp = self
            .client
            .post(&self.token_url)
            .form(&form)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| MonyError::Mail(format!("token refresh failed: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| MonyError::Mail(format!("token refresh read failed: {e}")))?;
        if !status.is_success() {
            warn!("google token refresh returned {status}");
            return Err(MonyError::Mail(format!(
                "token refresh returned {status}: {text}"
            )));
        }

        let refreshed: GmTokenResponse = serde_json::from_str(&text)
            .map_err(|e| MonyError::Mail(format!("token refresh parse failed: {e}")))?;
        tokens.access_token = refreshed.access_token;
        info!("gmail access token refreshed");
        Ok(())
    }
}

/// Search text with the cutoff appended.
pub(crate) fn scoped_query(query: &str, after_epoch: i64) -> String {
    format!("{query} after:{after_epoch}").trim().to_string()
}

/// The oldest record strictly newer than `after_epoch`.
pub(crate) fn oldest_after(records: Vec<EmailRecord>, after_epoch: i64) -> Option<EmailRecord> {
    records
        .into_iter()
        .filter(|r| r.internal_date > after_epoch)
        .min_by_key(|r| r.internal_date)
}

#[async_trait]
impl MailSource for GmailClient {
    fn name(&self) -> &str {
        "gmail"
    }

    async fn first_message_after(
        &self,
        query: &str,
        after_epoch: i64,
    ) -> Result<Option<EmailRecord>, MonyError> {
        let ids = self.list_ids(&scoped_query(query, after_epoch)).await?;
        debug!("gmail listed {} candidate(s) after {after_epoch}", ids.len());

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let message = self.get_message(&id).await?;
            // `after:` has day granularity on Gmail's side.
            if parse::internal_date_secs(&message) <= after_epoch {
                continue;
            }
            records.push(parse::to_record(message));
        }

        Ok(oldest_after(records, after_epoch))
    }
}
