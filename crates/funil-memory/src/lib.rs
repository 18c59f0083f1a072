//! # funil-memory
//!
//! Process-memory state for Funil: conversation history, open leads,
//! funnel counters and knowledge notes. Nothing survives a restart.

pub mod store;

pub use store::{Counters, Lead, Store};
