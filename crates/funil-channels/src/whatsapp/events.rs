//! Incoming WhatsApp webhook handling: filtering and conversion to
//! `IncomingMessage`.

use super::normalize_phone;
use super::types::{MediaRef, WebhookMessage, WebhookPayload};
use chrono::{DateTime, Utc};
use funil_core::message::{Attachment, AttachmentType, IncomingMessage};
use tracing::{debug, warn};
use uuid::Uuid;

/// Message types that carry nothing to answer.
const IGNORED_TYPES: &[&str] = &["reaction", "system", "ephemeral"];

/// Convert every user message in a webhook payload.
///
/// Status receipts, non-`messages` fields, reactions and senders outside
/// `allowed` (when non-empty) are dropped.
pub fn extract_messages(payload: &WebhookPayload, allowed: &[String]) -> Vec<IncomingMessage> {
    let mut out = Vec::new();

    for entry in &payload.entry {
        for change in &entry.changes {
            if change.field != "messages" {
                continue;
            }
            for msg in &change.value.messages {
                let phone = normalize_phone(&msg.from);
                if phone.is_empty() {
                    continue;
                }
                if !allowed.is_empty() && !allowed.iter().any(|a| normalize_phone(a) == phone) {
                    warn!("[whatsapp] ignoring message from unauthorized {phone}");
                    continue;
                }
                if IGNORED_TYPES.contains(&msg.message_type.as_str()) {
                    debug!("[whatsapp] skipping {} from {phone}", msg.message_type);
                    continue;
                }

                let sender_name = change
                    .value
                    .contacts
                    .iter()
                    .find(|c| normalize_phone(&c.wa_id) == phone)
                    .or_else(|| change.value.contacts.first())
                    .and_then(|c| c.profile.as_ref())
                    .map(|p| p.name.clone())
                    .filter(|n| !n.is_empty());

                let (text, attachments) = convert_body(msg);
                out.push(IncomingMessage {
                    id: Uuid::new_v4(),
                    channel: "whatsapp".to_string(),
                    sender_id: phone.clone(),
                    sender_name,
                    text,
                    timestamp: parse_timestamp(&msg.timestamp),
                    attachments,
                    reply_target: Some(phone),
                    platform_id: Some(msg.id.clone()).filter(|id| !id.is_empty()),
                });
            }
        }
    }

    out
}

fn convert_body(msg: &WebhookMessage) -> (String, Vec<Attachment>) {
    if msg.message_type == "text" {
        let text = msg.text.as_ref().map(|t| t.body.clone()).unwrap_or_default();
        return (text, Vec::new());
    }

    let media = match msg.message_type.as_str() {
        "image" => msg.image.as_ref(),
        "audio" => msg.audio.as_ref(),
        "voice" => msg.voice.as_ref().or(msg.audio.as_ref()),
        "video" => msg.video.as_ref(),
        "document" => msg.document.as_ref(),
        "sticker" => msg.sticker.as_ref(),
        _ => None,
    };

    match media {
        Some(media) => {
            let caption = media.caption.clone().unwrap_or_default();
            (caption, vec![media_attachment(&msg.message_type, media)])
        }
        // Location, contacts, interactive replies and the like.
        None => (
            String::new(),
            vec![Attachment {
                file_type: AttachmentType::Other,
                mime_type: None,
                media_id: None,
                data: None,
                filename: None,
            }],
        ),
    }
}

fn media_attachment(message_type: &str, media: &MediaRef) -> Attachment {
    let file_type = match media.mime_type.as_deref() {
        Some(mime) => AttachmentType::from_mime(mime),
        None => match message_type {
            "image" | "sticker" => AttachmentType::Image,
            "audio" | "voice" => AttachmentType::Audio,
            "video" => AttachmentType::Video,
            "document" => AttachmentType::Document,
            _ => AttachmentType::Other,
        },
    };
    Attachment {
        file_type,
        mime_type: media.mime_type.clone(),
        media_id: Some(media.id.clone()),
        data: None,
        filename: media.filename.clone(),
    }
}

/// Cloud API timestamps are Unix seconds as a string.
fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now)
}
