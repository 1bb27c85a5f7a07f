use super::{RunStatus, Store, TransactionRecord, WorkflowRun};
use mony_core::config::MemoryConfig;
use mony_core::error::MonyError;
use mony_core::finance::DEFAULT_CATEGORIES;

/// Create an in-memory store for testing.
async fn test_store() -> Store {
    let config = MemoryConfig {
        db_path: ":memory:".to_string(),
    };
    Store::new(&config).await.unwrap()
}

fn tx(user_id: &str, transaction_id: &str, category: &str) -> TransactionRecord {
    TransactionRecord {
        user_id: user_id.into(),
        transaction_id: transaction_id.into(),
        transaction_type: "debit".into(),
        amount: "250.00".into(),
        counterparty: "Cafe".into(),
        transaction_date: "2024-03-01".into(),
        transaction_time: "09:15:00".into(),
        category: category.into(),
        email_message_id: "msg-1".into(),
    }
}

fn run(user_id: &str, email: &str, start: i64, status: RunStatus) -> WorkflowRun {
    WorkflowRun {
        user_id: user_id.into(),
        user_transaction_id: None,
        run_start: start,
        run_end: start + 5,
        email_message_id: email.into(),
        email_subject: "Debit alert".into(),
        is_finance_email: true,
        run_status: status,
        error_message: None,
    }
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let store = test_store().await;
    Store::run_migrations(store.pool()).await.unwrap();
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _migrations")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_telegram_link_and_relink() {
    let store = test_store().await;
    assert_eq!(store.telegram_chat_id("u1").await.unwrap(), None);

    store.link_telegram("u1", "1001").await.unwrap();
    assert_eq!(
        store.telegram_chat_id("u1").await.unwrap().as_deref(),
        Some("1001")
    );

    store.link_telegram("u1", "2002").await.unwrap();
    assert_eq!(
        store.telegram_chat_id("u1").await.unwrap().as_deref(),
        Some("2002")
    );
}

#[tokio::test]
async fn test_categories_lifecycle() {
    let store = test_store().await;
    store.add_category("u1", "Food").await.unwrap();
    store.add_category("u1", " Travel ").await.unwrap();
    store.add_category("u1", "Food").await.unwrap();
    store.add_category("u2", "Rent").await.unwrap();

    assert_eq!(
        store.active_categories("u1").await.unwrap(),
        vec!["Food".to_string(), "Travel".to_string()]
    );

    assert!(store.deactivate_category("u1", "Food").await.unwrap());
    assert!(!store.deactivate_category("u1", "Food").await.unwrap());
    assert_eq!(store.active_categories("u1").await.unwrap(), vec!["Travel"]);

    // Re-adding brings it back in its original position.
    store.add_category("u1", "Food").await.unwrap();
    assert_eq!(
        store.active_categories("u1").await.unwrap(),
        vec!["Food", "Travel"]
    );
}

#[tokio::test]
async fn test_default_categories_seeded_once() {
    let store = test_store().await;
    store.add_category("u1", "Travel").await.unwrap();

    assert_eq!(store.add_default_categories("u1").await.unwrap(), 6);
    let active = store.active_categories("u1").await.unwrap();
    assert_eq!(active.len(), 7);
    assert_eq!(active[0], "Travel");
    assert_eq!(&active[1..], &DEFAULT_CATEGORIES);

    // Seeding again neither duplicates nor revives a deactivated default.
    assert!(store.deactivate_category("u1", "Others").await.unwrap());
    assert_eq!(store.add_default_categories("u1").await.unwrap(), 0);
    let active = store.active_categories("u1").await.unwrap();
    assert_eq!(active.len(), 6);
    assert!(!active.iter().any(|c| c == "Others"));

    assert!(store.active_categories("u2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_category_rejected() {
    let store = test_store().await;
    let err = store.add_category("u1", "   ").await.unwrap_err();
    assert!(matches!(err, MonyError::Validation(_)));
}

#[tokio::test]
async fn test_google_tokens() {
    let store = test_store().await;
    assert!(store.google_tokens("u1").await.unwrap().is_none());
    assert!(!store.update_access_token("u1", "new").await.unwrap());

    store.save_google_tokens("u2", "at2", "rt2").await.unwrap();
    store.save_google_tokens("u1", "at1", "rt1").await.unwrap();
    assert!(store.update_access_token("u1", "at1b").await.unwrap());

    assert_eq!(
        store.google_tokens("u1").await.unwrap(),
        Some(("at1b".to_string(), "rt1".to_string()))
    );
    assert_eq!(store.users_with_google().await.unwrap(), vec!["u1", "u2"]);
}

#[tokio::test]
async fn test_upsert_transaction_keeps_id() {
    let store = test_store().await;
    let first = store.upsert_transaction(&tx("u1", "T1", "Food")).await.unwrap();
    let other = store.upsert_transaction(&tx("u1", "T2", "Food")).await.unwrap();
    assert_ne!(first, other);

    let again = store
        .upsert_transaction(&tx("u1", "T1", "Dining"))
        .await
        .unwrap();
    assert_eq!(again, first);

    let saved = store.find_transaction("u1", "T1").await.unwrap().unwrap();
    assert_eq!(saved.category, "Dining");
    assert_eq!(store.transaction_count("u1").await.unwrap(), 2);
}

#[tokio::test]
async fn test_same_transaction_id_per_user() {
    let store = test_store().await;
    let a = store.upsert_transaction(&tx("u1", "T1", "Food")).await.unwrap();
    let b = store.upsert_transaction(&tx("u2", "T1", "Food")).await.unwrap();
    assert_ne!(a, b);
}

#[tokio::test]
async fn test_last_run_start() {
    let store = test_store().await;
    assert_eq!(store.last_run_start("u1").await.unwrap(), None);

    store
        .log_workflow_run(&run("u1", "m1", 1_000, RunStatus::Success))
        .await
        .unwrap();
    store
        .log_workflow_run(&run("u1", "m2", 3_000, RunStatus::Failure))
        .await
        .unwrap();
    store
        .log_workflow_run(&run("u2", "m3", 9_000, RunStatus::Success))
        .await
        .unwrap();

    assert_eq!(store.last_run_start("u1").await.unwrap(), Some(3_000));
}

#[tokio::test]
async fn test_only_successful_runs_count_as_processed() {
    let store = test_store().await;
    store
        .log_workflow_run(&run("u1", "m1", 1_000, RunStatus::Failure))
        .await
        .unwrap();
    assert!(!store.is_message_processed("u1", "m1").await.unwrap());

    let mut retried = run("u1", "m1", 2_000, RunStatus::Success);
    let tx_id = store.upsert_transaction(&tx("u1", "T1", "Food")).await.unwrap();
    retried.user_transaction_id = Some(tx_id);
    store.log_workflow_run(&retried).await.unwrap();

    assert!(store.is_message_processed("u1", "m1").await.unwrap());
    assert!(!store.is_message_processed("u2", "m1").await.unwrap());

    // The retry replaced the failed row rather than adding a second one.
    let runs = store.recent_runs("u1", 10).await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0], retried);
}

#[tokio::test]
async fn test_failure_message_round_trips() {
    let store = test_store().await;
    let mut failed = run("u1", "m9", 500, RunStatus::Failure);
    failed.is_finance_email = false;
    failed.error_message = Some("provider error: openai returned 500".into());
    store.log_workflow_run(&failed).await.unwrap();

    let runs = store.recent_runs("u1", 5).await.unwrap();
    assert_eq!(runs, vec![failed]);
}
