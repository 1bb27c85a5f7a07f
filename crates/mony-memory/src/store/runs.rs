//! Workflow run log.

use super::Store;
use mony_core::error::MonyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    fn from_db(s: &str) -> Self {
        if s == "success" {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

/// One pipeline run over one email. Times are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRun {
    pub user_id: String,
    pub user_transaction_id: Option<i64>,
    pub run_start: i64,
    pub run_end: i64,
    pub email_message_id: String,
    pub email_subject: String,
    pub is_finance_email: bool,
    pub run_status: RunStatus,
    pub error_message: Option<String>,
}

type RunRow = (
    String,
    Option<i64>,
    i64,
    i64,
    String,
    String,
    bool,
    String,
    Option<String>,
);

impl From<RunRow> for WorkflowRun {
    fn from(row: RunRow) -> Self {
        let (
            user_id,
            user_transaction_id,
            run_start,
            run_end,
            email_message_id,
            email_subject,
            is_finance_email,
            run_status,
            error_message,
        ) = row;
        Self {
            user_id,
            user_transaction_id,
            run_start,
            run_end,
            email_message_id,
            email_subject,
            is_finance_email,
            run_status: RunStatus::from_db(&run_status),
            error_message,
        }
    }
}

impl Store {
    /// Start time of the user's latest run, if any.
    pub async fn last_run_start(&self, user_id: &str) -> Result<Option<i64>, MonyError> {
        let (start,): (Option<i64>,) =
            sqlx::query_as("SELECT MAX(run_start) FROM workflow_run WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| MonyError::Memory(format!("query failed: {e}")))?;

        Ok(start)
    }

    /// Whether this email already went through a successful run.
    pub async fn is_message_processed(
        &self,
        user_id: &str,
        email_message_id: &str,
    ) -> Result<bool, MonyError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM workflow_run \
             WHERE user_id = ? AND email_message_id = ? AND run_status = 'success'",
        )
        .bind(user_id)
        .bind(email_message_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| MonyError::Memory(format!("query failed: {e}")))?;

        Ok(row.is_some())
    }

    /// Record a run (upsert by user + email).
    pub async fn log_workflow_run(&self, run: &WorkflowRun) -> Result<(), MonyError> {
        sqlx::query(
            "INSERT INTO workflow_run \
             (user_id, user_transaction_id, run_start, run_end, email_message_id, \
              email_subject, is_finance_email, run_status, error_message) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(user_id, email_message_id) DO UPDATE SET \
              user_transaction_id = excluded.user_transaction_id, \
              run_start = excluded.run_start, \
              run_end = excluded.run_end, \
              email_subject = excluded.email_subject, \
              is_finance_email = excluded.is_finance_email, \
              run_status = excluded.run_status, \
              error_message = excluded.error_message, \
              updated_at = datetime('now')",
        )
        .bind(&run.user_id)
        .bind(run.user_transaction_id)
        .bind(run.run_start)
        .bind(run.run_end)
        .bind(&run.email_message_id)
        .bind(&run.email_subject)
        .bind(run.is_finance_email)
        .bind(run.run_status.as_str())
        .bind(&run.error_message)
        .execute(&self.pool)
        .await
        .map_err(|e| MonyError::Memory(format!("log workflow run failed: {e}")))?;

        Ok(())
    }

    /// Latest runs first.
    pub async fn recent_runs(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<WorkflowRun>, MonyError> {
        let rows: Vec<RunRow> = sqlx::query_as(
            "SELECT user_id, user_transaction_id, run_start, run_end, email_message_id, \
             email_subject, is_finance_email, run_status, error_message \
             FROM workflow_run WHERE user_id = ? ORDER BY run_start DESC, id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MonyError::Memory(format!("query failed: {e}")))?;

        Ok(rows.into_iter().map(WorkflowRun::from).collect())
    }
}
