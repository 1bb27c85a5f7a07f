//! # mony-channels
//!
//! I/O edges of the Mony pipeline: the Telegram long-poll selection engine
//! and the Gmail inbox source.

pub mod gmail;
pub mod telegram;
