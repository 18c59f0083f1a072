//! Message processing pipeline: the main handle_message flow.

use super::{sender_key, Gateway};
use crate::commands::{self, Command, CommandContext};
use crate::replies;
use funil_core::{
    error::FunilError,
    message::{Attachment, AttachmentType, IncomingMessage},
};
use std::sync::Arc;
use tracing::{debug, error, info};

impl Gateway {
    /// Process a single incoming message and reply to it.
    ///
    /// The work runs in its own task so that a panic in any handler is
    /// contained here and answered with the generic apology.
    pub(super) async fn handle_message(self: Arc<Self>, incoming: IncomingMessage) {
        let preview = if incoming.text.chars().count() > 60 {
            let truncated: String = incoming.text.chars().take(60).collect();
            format!("{truncated}...")
        } else {
            incoming.text.clone()
        };
        info!(
            "[{}] {} says: {}",
            incoming.channel,
            incoming.sender_name.as_deref().unwrap_or("unknown"),
            preview
        );

        if let Ok(channel) = self.channel_for(&incoming) {
            if let Err(e) = channel.send_typing(&incoming).await {
                debug!("[{}] typing indicator failed: {e}", incoming.channel);
            }
        }

        let gw = self.clone();
        let msg = incoming.clone();
        let reply = match tokio::spawn(async move { gw.respond(&msg).await }).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                error!(
                    "[{}] failed to process message from {}: {e}",
                    incoming.channel, incoming.sender_id
                );
                replies::GENERIC_APOLOGY.to_string()
            }
            Err(e) => {
                error!(
                    "[{}] handler panicked on message from {}: {e}",
                    incoming.channel, incoming.sender_id
                );
                replies::GENERIC_APOLOGY.to_string()
            }
        };

        self.send_text(&incoming, &reply).await;
    }

    /// Work out the reply text for one message.
    pub(super) async fn respond(&self, incoming: &IncomingMessage) -> Result<String, FunilError> {
        let key = sender_key(incoming);
        let text = incoming.text.trim();

        match Command::parse(text) {
            Some(cmd) => {
                // A fresh command replaces whatever prompt was pending.
                self.pending.lock().await.remove(&key);
                info!("[{}] command {} from {}", incoming.channel, cmd.token(), incoming.sender_id);
                return self
                    .run_command(cmd, Command::argument(text), incoming, &key)
                    .await;
            }
            None => {
                let pending = self.pending.lock().await.remove(&key);
                if let Some(cmd) = pending {
                    return self.resume_command(cmd, incoming, &key).await;
                }
            }
        }

        if incoming.has_media() {
            return self.handle_media(incoming).await;
        }
        if text.is_empty() {
            return Ok(replies::GREETING.to_string());
        }
        Ok(self.relay_text(incoming, text).await)
    }

    async fn run_command(
        &self,
        cmd: Command,
        argument: &str,
        incoming: &IncomingMessage,
        key: &str,
    ) -> Result<String, FunilError> {
        if cmd == Command::Image {
            if let Some(image) = first_image(incoming) {
                return self.describe_image(incoming, image).await;
            }
        }
        if cmd.takes_argument() && (argument.is_empty() || cmd == Command::Image) {
            self.pending.lock().await.insert(key.to_string(), cmd);
            return Ok(cmd.prompt().to_string());
        }
        Ok(self.execute(cmd, argument).await)
    }

    /// Consume the message as the argument of a pending command.
    async fn resume_command(
        &self,
        cmd: Command,
        incoming: &IncomingMessage,
        key: &str,
    ) -> Result<String, FunilError> {
        let text = incoming.text.trim();
        if replies::is_cancel(text) {
            info!("[{}] {} cancelled by {}", incoming.channel, cmd.token(), incoming.sender_id);
            return Ok(replies::CANCELLED.to_string());
        }

        if cmd == Command::Image {
            if let Some(image) = first_image(incoming) {
                return self.describe_image(incoming, image).await;
            }
        } else if !text.is_empty() {
            return Ok(self.execute(cmd, text).await);
        }

        // Still no usable argument: ask again.
        self.pending.lock().await.insert(key.to_string(), cmd);
        Ok(cmd.prompt().to_string())
    }

    async fn execute(&self, cmd: Command, argument: &str) -> String {
        let ctx = CommandContext {
            store: &self.store,
            provider: self.provider.as_ref(),
            analyzer: self.analyzer.as_ref(),
            temp_dir: &self.temp_dir,
            argument,
        };
        commands::handle(cmd, &ctx).await
    }
}

/// First image attachment, judged by MIME type when present.
fn first_image(incoming: &IncomingMessage) -> Option<&Attachment> {
    incoming
        .attachments
        .iter()
        .find(|a| super::media::category(a) == AttachmentType::Image)
}
