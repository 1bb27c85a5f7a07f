//! Per-user links: Telegram chat and Google OAuth tokens.

use super::Store;
use mony_core::error::MonyError;

impl Store {
    /// Link (or relink) a user to a Telegram chat.
    pub async fn link_telegram(&self, user_id: &str, chat_id: &str) -> Result<(), MonyError> {
        sqlx::query(
            "INSERT INTO user_telegram (user_id, chat_id) VALUES (?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET chat_id = excluded.chat_id, linked_at = datetime('now')",
        )
        .bind(user_id)
        .bind(chat_id)
        .execute(&self.pool)
        .await
        .map_err(|e| MonyError::Memory(format!("link telegram failed: {e}")))?;

        Ok(())
    }

    pub async fn telegram_chat_id(&self, user_id: &str) -> Result<Option<String>, MonyError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT chat_id FROM user_telegram WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| MonyError::Memory(format!("query failed: {e}")))?;

        Ok(row.map(|(c,)| c))
    }

    /// Store both OAuth tokens (upsert by user).
    pub async fn save_google_tokens(
        &self,
        user_id: &str,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), MonyError> {
        sqlx::query(
            "INSERT INTO user_google_token (user_id, access_token, refresh_token) VALUES (?, ?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET access_token = excluded.access_token, \
             refresh_token = excluded.refresh_token, updated_at = datetime('now')",
        )
        .bind(user_id)
        .bind(access_token)
        .bind(refresh_token)
        .execute(&self.pool)
        .await
        .map_err(|e| MonyError::Memory(format!("save google tokens failed: {e}")))?;

        Ok(())
    }

    /// `(access_token, refresh_token)` for a user.
    pub async fn google_tokens(
        &self,
        user_id: &str,
    ) -> Result<Option<(String, String)>, MonyError> {
        let row: Option<(String, String)> = sqlx::query_as(
            "SELECT access_token, refresh_token FROM user_google_token WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| MonyError::Memory(format!("query failed: {e}")))?;

        Ok(row)
    }

    /// Replace the access token after a refresh. Returns `false` if the user
    /// has no tokens stored.
    pub async fn update_access_token(
        &self,
        user_id: &str,
        access_token: &str,
    ) -> Result<bool, MonyError> {
        let result = sqlx::query(
            "UPDATE user_google_token SET access_token = ?, updated_at = datetime('now') \
             WHERE user_id = ?",
        )
        .bind(access_token)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| MonyError::Memory(format!("update access token failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Every user with a connected mailbox.
    pub async fn users_with_google(&self) -> Result<Vec<String>, MonyError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT user_id FROM user_google_token ORDER BY user_id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| MonyError::Memory(format!("query failed: {e}")))?;

        Ok(rows.into_iter().map(|(u,)| u).collect())
    }
}
