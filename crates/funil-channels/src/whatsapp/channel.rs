//! Channel trait implementation for the Cloud API.

use super::types::{MediaInfo, SendText, SendTextRequest, TypingIndicator, TypingRequest};
use super::{normalize_phone, WhatsAppCloudChannel, MAX_TEXT_LEN};
use crate::utils::split_message;
use async_trait::async_trait;
use funil_core::{
    error::FunilError,
    message::{Attachment, IncomingMessage, OutgoingMessage},
    traits::Channel,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

impl WhatsAppCloudChannel {
    /// Send a text message to a phone number, split into API-sized chunks.
    async fn send_text(&self, to: &str, text: &str) -> Result<(), FunilError> {
        let to = normalize_phone(to);
        if to.is_empty() {
            return Err(FunilError::Channel("invalid whatsapp recipient".into()));
        }
        let url = self.api_url(&format!("{}/messages", self.config.phone_number_id));

        for chunk in split_message(text, MAX_TEXT_LEN) {
            let body = SendTextRequest {
                messaging_product: "whatsapp",
                recipient_type: "individual",
                to: &to,
                message_type: "text",
                text: SendText {
                    preview_url: false,
                    body: chunk,
                },
            };

            let resp = self
                .client
                .post(&url)
                .bearer_auth(&self.config.access_token)
                .json(&body)
                .send()
                .await
                .map_err(|e| FunilError::Channel(format!("whatsapp send failed: {e}")))?;

            if !resp.status().is_success() {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                return Err(FunilError::Channel(format!(
                    "whatsapp API error {status}: {text}"
                )));
            }
        }

        debug!("[whatsapp] sent {} bytes to {to}", text.len());
        Ok(())
    }

    /// Resolve a media id to its short-lived URL, then fetch the bytes.
    async fn fetch_media(&self, media_id: &str) -> Result<Vec<u8>, FunilError> {
        let resp = self
            .client
            .get(self.api_url(media_id))
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| FunilError::Channel(format!("whatsapp media lookup failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(FunilError::Channel(format!(
                "whatsapp media lookup error {status}: {text}"
            )));
        }

        let info: MediaInfo = resp
            .json()
            .await
            .map_err(|e| FunilError::Channel(format!("whatsapp media lookup parse failed: {e}")))?;

        let resp = self
            .client
            .get(&info.url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| FunilError::Channel(format!("whatsapp media download failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(FunilError::Channel(format!(
                "whatsapp media download error {}",
                resp.status()
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| FunilError::Channel(format!("whatsapp media read failed: {e}")))?;
        debug!(
            "[whatsapp] downloaded media {media_id} ({} bytes, {})",
            bytes.len(),
            info.mime_type.as_deref().unwrap_or("unknown type")
        );
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Channel for WhatsAppCloudChannel {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, FunilError> {
        let (tx, rx) = mpsc::channel(64);
        *self.msg_tx.lock().await = Some(tx);
        info!(
            "WhatsApp channel started (phone number id {})",
            self.config.phone_number_id
        );
        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), FunilError> {
        let target = message
            .reply_target
            .as_deref()
            .ok_or_else(|| FunilError::Channel("no reply_target on outgoing message".into()))?;

        self.send_text(target, &message.text).await
    }

    async fn send_typing(&self, incoming: &IncomingMessage) -> Result<(), FunilError> {
        // Only webhook messages carry a wamid to acknowledge.
        let Some(message_id) = incoming.platform_id.as_deref() else {
            return Ok(());
        };
        let body = TypingRequest {
            messaging_product: "whatsapp",
            status: "read",
            message_id,
            typing_indicator: TypingIndicator { kind: "text" },
        };
        let resp = self
            .client
            .post(self.api_url(&format!("{}/messages", self.config.phone_number_id)))
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| FunilError::Channel(format!("whatsapp typing failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(FunilError::Channel(format!(
                "whatsapp typing error {}",
                resp.status()
            )));
        }
        Ok(())
    }

    async fn download_media(&self, attachment: &Attachment) -> Result<Vec<u8>, FunilError> {
        if let Some(ref data) = attachment.data {
            return Ok(data.clone());
        }
        let media_id = attachment
            .media_id
            .as_deref()
            .ok_or_else(|| FunilError::Channel("attachment has no media id".into()))?;
        self.fetch_media(media_id).await
    }

    async fn stop(&self) -> Result<(), FunilError> {
        info!("WhatsApp channel stopped");
        *self.msg_tx.lock().await = None;
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
