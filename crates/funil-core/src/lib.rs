//! # funil-core
//!
//! Core types, traits, configuration, product catalog and error handling
//! shared by every Funil crate.

pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod message;
pub mod traits;
