//! # mony-memory
//!
//! Persistent store for Mony (SQLite-backed).

pub mod store;

pub use store::{RunStatus, Store, TransactionRecord, WorkflowRun};
