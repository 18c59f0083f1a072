//! Cloud API wire types: inbound webhook payloads and outbound requests.

use serde::{Deserialize, Serialize};

/// Inbound webhook notification (`object = "whatsapp_business_account"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookChange {
    pub value: WebhookValue,
    #[serde(default)]
    pub field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookValue {
    #[serde(default)]
    pub messaging_product: String,
    #[serde(default)]
    pub contacts: Vec<WebhookContact>,
    #[serde(default)]
    pub messages: Vec<WebhookMessage>,
    /// Delivery receipts. Ignored.
    #[serde(default)]
    pub statuses: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookContact {
    pub profile: Option<WebhookProfile>,
    pub wa_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookProfile {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookMessage {
    pub from: String,
    pub id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub text: Option<TextBody>,
    pub image: Option<MediaRef>,
    pub audio: Option<MediaRef>,
    pub voice: Option<MediaRef>,
    pub video: Option<MediaRef>,
    pub document: Option<MediaRef>,
    pub sticker: Option<MediaRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBody {
    pub body: String,
}

/// Media handle inside an inbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRef {
    pub id: String,
    pub mime_type: Option<String>,
    pub caption: Option<String>,
    pub filename: Option<String>,
}

/// Marks an inbound message read and shows the typing indicator.
#[derive(Debug, Serialize)]
pub(super) struct TypingRequest<'a> {
    pub messaging_product: &'static str,
    pub status: &'static str,
    pub message_id: &'a str,
    pub typing_indicator: TypingIndicator,
}

#[derive(Debug, Serialize)]
pub(super) struct TypingIndicator {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// `POST /{version}/{phone_number_id}/messages` body for a text message.
#[derive(Debug, Serialize)]
pub(super) struct SendTextRequest<'a> {
    pub messaging_product: &'static str,
    pub recipient_type: &'static str,
    pub to: &'a str,
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub text: SendText<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct SendText<'a> {
    pub preview_url: bool,
    pub body: &'a str,
}

/// `GET /{version}/{media_id}` response.
#[derive(Debug, Deserialize)]
pub(super) struct MediaInfo {
    pub url: String,
    pub mime_type: Option<String>,
}
