//! Media messages: audio is transcribed and relayed, images are labeled.

use super::Gateway;
use crate::replies;
use funil_core::{
    error::FunilError,
    message::{Attachment, AttachmentType, IncomingMessage},
    traits::ImageLabel,
};
use std::future::Future;
use std::path::PathBuf;
use tracing::{info, warn};

const IMAGE_APOLOGY: &str = "Desculpe, ocorreu um erro ao analisar a imagem.";

/// Removes a temp file when dropped, whatever path the handler took.
struct TempFileGuard {
    path: PathBuf,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to delete temp file {}: {e}", self.path.display());
            }
        }
    }
}

/// Guard the path first, then write it, so a failed or partial write is
/// cleaned up as well.
async fn stage_temp_file<W, Fut>(path: PathBuf, write: W) -> Result<TempFileGuard, FunilError>
where
    W: FnOnce(PathBuf) -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    let guard = TempFileGuard::new(path.clone());
    write(path).await?;
    Ok(guard)
}

/// MIME category when the platform reported one, else the channel's guess.
pub(super) fn category(attachment: &Attachment) -> AttachmentType {
    attachment
        .mime_type
        .as_deref()
        .map(AttachmentType::from_mime)
        .unwrap_or(attachment.file_type)
}

/// Base MIME type without parameters (`audio/ogg; codecs=opus` → `audio/ogg`).
fn base_mime(attachment: &Attachment) -> String {
    attachment
        .mime_type
        .as_deref()
        .and_then(|m| m.split(';').next())
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "audio/ogg".to_string())
}

/// File extension from a MIME subtype, sanitized for use in a file name.
fn extension(mime: &str) -> String {
    let sub: String = mime
        .split('/')
        .nth(1)
        .unwrap_or("bin")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if sub.is_empty() {
        "bin".to_string()
    } else {
        sub
    }
}

/// `🖼️ Objetos detectados: Gato (97%), Mesa (88%)`, best `limit` labels first.
pub(super) fn format_labels(mut labels: Vec<ImageLabel>, limit: usize) -> String {
    if labels.is_empty() {
        return "🖼️ Nenhum objeto reconhecido na imagem.".to_string();
    }
    labels.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let listed = labels
        .iter()
        .take(limit.max(1))
        .map(|l| format!("{} ({:.0}%)", l.description, l.score * 100.0))
        .collect::<Vec<_>>()
        .join(", ");
    format!("🖼️ Objetos detectados: {listed}")
}

impl Gateway {
    pub(super) async fn handle_media(
        &self,
        incoming: &IncomingMessage,
    ) -> Result<String, FunilError> {
        let Some(attachment) = incoming.attachments.first() else {
            return Ok(replies::GREETING.to_string());
        };
        match category(attachment) {
            AttachmentType::Audio => self.handle_audio(incoming, attachment).await,
            AttachmentType::Image => self.describe_image(incoming, attachment).await,
            other => {
                info!("[{}] unsupported media {other:?} from {}", incoming.channel, incoming.sender_id);
                Ok(replies::UNSUPPORTED_MEDIA.to_string())
            }
        }
    }

    /// Transcribe a voice note and treat the transcript as typed text.
    async fn handle_audio(
        &self,
        incoming: &IncomingMessage,
        attachment: &Attachment,
    ) -> Result<String, FunilError> {
        let bytes = self.channel_for(incoming)?.download_media(attachment).await?;

        let mime = base_mime(attachment);
        tokio::fs::create_dir_all(&self.temp_dir).await?;
        let path = self
            .temp_dir
            .join(format!("{}.{}", incoming.id, extension(&mime)));
        let _guard = stage_temp_file(path.clone(), |p| tokio::fs::write(p, &bytes)).await?;

        let transcript = match self.transcriber.transcribe(&path, &mime).await {
            Ok(t) => t,
            Err(e) => {
                warn!("[{}] transcription failed for {}: {e}", incoming.channel, incoming.sender_id);
                return Ok(replies::AI_APOLOGY.to_string());
            }
        };

        let transcript = transcript.trim();
        info!(
            "[{}] transcribed {} bytes from {}: {} chars",
            incoming.channel,
            bytes.len(),
            incoming.sender_id,
            transcript.chars().count()
        );
        if transcript.is_empty() {
            return Ok(replies::GREETING.to_string());
        }
        Ok(self.relay_text(incoming, transcript).await)
    }

    pub(super) async fn describe_image(
        &self,
        incoming: &IncomingMessage,
        attachment: &Attachment,
    ) -> Result<String, FunilError> {
        let bytes = self.channel_for(incoming)?.download_media(attachment).await?;
        match self.vision.labels(&bytes).await {
            Ok(labels) => Ok(format_labels(labels, self.max_labels)),
            Err(e) => {
                warn!("[{}] image labeling failed for {}: {e}", incoming.channel, incoming.sender_id);
                Ok(IMAGE_APOLOGY.to_string())
            }
        }
    }
}
