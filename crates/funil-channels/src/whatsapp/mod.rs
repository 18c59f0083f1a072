//! WhatsApp channel over the WhatsApp Business Cloud API.
//!
//! Outbound messages and media downloads go through the Graph API with the
//! configured access token. Inbound messages are pushed by Meta to the bot's
//! `/whatsapp` HTTP route, which hands each payload to [`WhatsAppCloudChannel::ingest`].

mod channel;
mod events;
mod types;

#[cfg(test)]
mod tests;

pub use events::extract_messages;
pub use types::*;

use funil_core::{config::WhatsAppConfig, error::FunilError, message::IncomingMessage};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

/// Cloud API text messages are limited to 4096 characters.
pub(super) const MAX_TEXT_LEN: usize = 4096;

/// WhatsApp channel backed by the Cloud API.
pub struct WhatsAppCloudChannel {
    pub(super) config: WhatsAppConfig,
    pub(super) client: reqwest::Client,
    /// Gateway queue; set by `start()`.
    pub(super) msg_tx: Arc<Mutex<Option<mpsc::Sender<IncomingMessage>>>>,
}

impl WhatsAppCloudChannel {
    pub fn new(config: WhatsAppConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            msg_tx: Arc::new(Mutex::new(None)),
        }
    }

    /// Answer the webhook verification handshake. Returns the challenge to
    /// echo, or `None` when the request must be rejected.
    pub fn verify_webhook(&self, mode: &str, token: &str, challenge: &str) -> Option<String> {
        if self.config.verify_token.is_empty() {
            warn!("[whatsapp] webhook verification attempted but no verify_token is configured");
            return None;
        }
        if mode == "subscribe" && token == self.config.verify_token {
            info!("[whatsapp] webhook verified");
            Some(challenge.to_string())
        } else {
            None
        }
    }

    /// Forward the user messages of an inbound payload to the gateway.
    /// Returns how many were queued.
    pub async fn ingest(&self, payload: &WebhookPayload) -> Result<usize, FunilError> {
        let messages = extract_messages(payload, &self.config.allowed_users);
        if messages.is_empty() {
            return Ok(0);
        }

        let tx = self
            .msg_tx
            .lock()
            .await
            .clone()
            .ok_or_else(|| FunilError::Channel("whatsapp channel not started".into()))?;

        let count = messages.len();
        for msg in messages {
            tx.send(msg)
                .await
                .map_err(|_| FunilError::Channel("whatsapp receiver dropped".into()))?;
        }
        Ok(count)
    }

    /// Graph API URL for `path` under the configured version.
    pub(super) fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_version,
            path.trim_start_matches('/')
        )
    }
}

/// Reduce any WhatsApp address form (`+55 11 9...`, `5511...@c.us`,
/// `5511...@s.whatsapp.net`) to bare digits.
pub fn normalize_phone(raw: &str) -> String {
    let user = raw.split('@').next().unwrap_or(raw);
    user.chars().filter(char::is_ascii_digit).collect()
}
