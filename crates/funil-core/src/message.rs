use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An incoming message from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Channel name (e.g. "whatsapp").
    pub channel: String,
    /// Platform-specific user ID (a phone number for WhatsApp).
    pub sender_id: String,
    /// Human-readable sender name.
    pub sender_name: Option<String>,
    /// Message text content (caption for media messages).
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub attachments: Vec<Attachment>,
    /// Platform-specific target for routing the response.
    #[serde(default)]
    pub reply_target: Option<String>,
    /// The platform's own id for this message (a `wamid` on WhatsApp).
    #[serde(default)]
    pub platform_id: Option<String>,
}

impl IncomingMessage {
    /// Build a plain text message. Used by the CLI and tests.
    pub fn text(channel: &str, sender_id: &str, text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.to_string(),
            sender_id: sender_id.to_string(),
            sender_name: None,
            text: text.to_string(),
            timestamp: Utc::now(),
            attachments: Vec::new(),
            reply_target: Some(sender_id.to_string()),
            platform_id: None,
        }
    }

    /// Whether the message carries at least one attachment.
    pub fn has_media(&self) -> bool {
        !self.attachments.is_empty()
    }
}

/// An outgoing message to send back through a channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    pub metadata: MessageMetadata,
    /// Platform-specific target for routing.
    #[serde(default)]
    pub reply_target: Option<String>,
}

impl OutgoingMessage {
    /// Plain text addressed to `target`.
    pub fn to(target: &str, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: MessageMetadata::default(),
            reply_target: Some(target.to_string()),
        }
    }
}

/// Metadata about how a message was generated.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessageMetadata {
    /// Which provider produced this response.
    pub provider_used: String,
    /// Token count (if available from the provider).
    pub tokens_used: Option<u64>,
    /// Wall-clock processing time in milliseconds.
    pub processing_time_ms: u64,
    /// Model identifier (if applicable).
    pub model: Option<String>,
}

/// A media attachment on a message.
///
/// Channels may deliver the bytes inline (`data`) or only a platform media
/// handle (`media_id`) that is resolved lazily through `Channel::download_media`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub file_type: AttachmentType,
    /// MIME type as reported by the platform (e.g. `audio/ogg; codecs=opus`).
    pub mime_type: Option<String>,
    pub media_id: Option<String>,
    pub data: Option<Vec<u8>>,
    pub filename: Option<String>,
}

/// Supported attachment types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentType {
    Image,
    Document,
    Audio,
    Video,
    Other,
}

impl AttachmentType {
    /// Classify by the top-level MIME category.
    pub fn from_mime(mime: &str) -> Self {
        let top = mime.split('/').next().unwrap_or("").trim().to_lowercase();
        match top.as_str() {
            "audio" => Self::Audio,
            "image" => Self::Image,
            "video" => Self::Video,
            "application" | "text" => Self::Document,
            _ => Self::Other,
        }
    }
}
