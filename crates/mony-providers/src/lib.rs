//! # mony-providers
//!
//! Completion provider implementations for Mony.

pub mod openai;
