//! Spending categories.

use super::Store;
use mony_core::{error::MonyError, finance::DEFAULT_CATEGORIES};

impl Store {
    /// Add a category, reactivating it if it was previously deactivated.
    pub async fn add_category(&self, user_id: &str, name: &str) -> Result<(), MonyError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MonyError::Validation("category name is empty".into()));
        }

        sqlx::query(
            "INSERT INTO transaction_category (user_id, name) VALUES (?, ?) \
             ON CONFLICT(user_id, name) DO UPDATE SET is_active = 1",
        )
        .bind(user_id)
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| MonyError::Memory(format!("add category failed: {e}")))?;

        Ok(())
    }

    /// Seed the default categories. Existing rows, active or not, are left
    /// alone. Returns how many were added.
    pub async fn add_default_categories(&self, user_id: &str) -> Result<u64, MonyError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| MonyError::Memory(format!("begin failed: {e}")))?;

        let mut added = 0;
        for name in DEFAULT_CATEGORIES {
            let result = sqlx::query(
                "INSERT INTO transaction_category (user_id, name) VALUES (?, ?) \
                 ON CONFLICT(user_id, name) DO NOTHING",
            )
            .bind(user_id)
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(|e| MonyError::Memory(format!("seed categories failed: {e}")))?;
            added += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| MonyError::Memory(format!("commit failed: {e}")))?;
        Ok(added)
    }

    /// Returns `true` if an active category was deactivated.
    pub async fn deactivate_category(&self, user_id: &str, name: &str) -> Result<bool, MonyError> {
        let result = sqlx::query(
            "UPDATE transaction_category SET is_active = 0 \
             WHERE user_id = ? AND name = ? AND is_active = 1",
        )
        .bind(user_id)
        .bind(name.trim())
        .execute(&self.pool)
        .await
        .map_err(|e| MonyError::Memory(format!("deactivate category failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Active category names in the order they were added.
    pub async fn active_categories(&self, user_id: &str) -> Result<Vec<String>, MonyError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM transaction_category WHERE user_id = ? AND is_active = 1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MonyError::Memory(format!("query failed: {e}")))?;

        Ok(rows.into_iter().map(|(n,)| n).collect())
    }
}
