//! # mony-core
//!
//! Core types, traits, configuration, and error handling for the Mony pipeline.

pub mod config;
pub mod context;
pub mod error;
pub mod finance;
pub mod message;
pub mod traits;

pub use config::shellexpand;
