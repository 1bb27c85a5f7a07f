//! The transaction ledger.

use super::Store;
use mony_core::error::MonyError;

/// One categorized transaction, keyed by `(user_id, transaction_id)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct TransactionRecord {
    pub user_id: String,
    pub transaction_id: String,
    pub transaction_type: String,
    pub amount: String,
    pub counterparty: String,
    pub transaction_date: String,
    pub transaction_time: String,
    pub category: String,
    pub email_message_id: String,
}

impl Store {
    /// Insert or update a transaction. Returns its row id, which stays the
    /// same when an existing row is updated.
    pub async fn upsert_transaction(&self, tx: &TransactionRecord) -> Result<i64, MonyError> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO user_transactions \
             (user_id, transaction_id, transaction_type, amount, counterparty, \
              transaction_date, transaction_time, category, email_message_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(user_id, transaction_id) DO UPDATE SET \
              transaction_type = excluded.transaction_type, \
              amount = excluded.amount, \
              counterparty = excluded.counterparty, \
              transaction_date = excluded.transaction_date, \
              transaction_time = excluded.transaction_time, \
              category = excluded.category, \
              email_message_id = excluded.email_message_id, \
              updated_at = datetime('now') \
             RETURNING id",
        )
        .bind(&tx.user_id)
        .bind(&tx.transaction_id)
        .bind(&tx.transaction_type)
        .bind(&tx.amount)
        .bind(&tx.counterparty)
        .bind(&tx.transaction_date)
        .bind(&tx.transaction_time)
        .bind(&tx.category)
        .bind(&tx.email_message_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| MonyError::Memory(format!("upsert transaction failed: {e}")))?;

        Ok(id)
    }

    pub async fn find_transaction(
        &self,
        user_id: &str,
        transaction_id: &str,
    ) -> Result<Option<TransactionRecord>, MonyError> {
        sqlx::query_as(
            "SELECT user_id, transaction_id, transaction_type, amount, counterparty, \
             transaction_date, transaction_time, category, email_message_id \
             FROM user_transactions WHERE user_id = ? AND transaction_id = ?",
        )
        .bind(user_id)
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| MonyError::Memory(format!("query failed: {e}")))
    }

    pub async fn transaction_count(&self, user_id: &str) -> Result<i64, MonyError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM user_transactions WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| MonyError::Memory(format!("query failed: {e}")))?;

        Ok(count)
    }
}
