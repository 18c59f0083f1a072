//! # funil-channels
//!
//! Messaging platform integrations for Funil.

pub mod utils;
pub mod whatsapp;

pub use whatsapp::WhatsAppCloudChannel;
