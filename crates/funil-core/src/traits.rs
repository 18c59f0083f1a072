use crate::{
    context::Context,
    error::FunilError,
    message::{Attachment, IncomingMessage, OutgoingMessage},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Text generation backend.
///
/// The relay sends every free-text message that no local heuristic answered
/// through this trait.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Whether this provider requires an API key to function.
    fn requires_api_key(&self) -> bool;

    /// Send a conversation context to the provider and get a response.
    async fn complete(&self, context: &Context) -> Result<OutgoingMessage, FunilError>;

    /// Check if the provider is configured and reachable.
    async fn is_available(&self) -> bool;
}

/// Top sentiment label for a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: String,
    pub score: f64,
}

/// A named entity found in a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub word: String,
    /// Entity class (e.g. `PER`, `LOC`, `ORG`).
    pub group: String,
    pub score: f64,
}

/// A label attached to an image by a vision service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLabel {
    pub description: String,
    pub score: f64,
}

/// Text analysis backend: sentiment, translation, NER and summarization.
#[async_trait]
pub trait Analyzer: Send + Sync {
    fn name(&self) -> &str;

    async fn sentiment(&self, text: &str) -> Result<Sentiment, FunilError>;

    async fn translate(&self, text: &str) -> Result<String, FunilError>;

    async fn entities(&self, text: &str) -> Result<Vec<Entity>, FunilError>;

    async fn summarize(&self, text: &str) -> Result<String, FunilError>;
}

/// Image labeling backend.
#[async_trait]
pub trait Vision: Send + Sync {
    fn name(&self) -> &str;

    /// Label an image. Results are in the order returned by the service.
    async fn labels(&self, image: &[u8]) -> Result<Vec<ImageLabel>, FunilError>;
}

/// Speech-to-text backend.
#[async_trait]
pub trait Transcriber: Send + Sync {
    fn name(&self) -> &str;

    /// Transcribe the audio file at `path`.
    async fn transcribe(&self, path: &Path, mime_type: &str) -> Result<String, FunilError>;
}

/// Messaging channel.
///
/// Every messaging platform implements this trait to receive and send
/// messages.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    /// Returns a receiver that yields incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, FunilError>;

    /// Send a message through this channel.
    async fn send(&self, message: OutgoingMessage) -> Result<(), FunilError>;

    /// Send a typing indicator to show the bot is processing `incoming`.
    async fn send_typing(&self, _incoming: &IncomingMessage) -> Result<(), FunilError> {
        Ok(())
    }

    /// Fetch the bytes of an attachment.
    ///
    /// The default returns inline data; channels that deliver media handles
    /// override this to download lazily.
    async fn download_media(&self, attachment: &Attachment) -> Result<Vec<u8>, FunilError> {
        attachment
            .data
            .clone()
            .ok_or_else(|| FunilError::Channel("attachment has no inline data".into()))
    }

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), FunilError>;

    /// Downcast support for channel-specific HTTP routes.
    fn as_any(&self) -> &dyn std::any::Any;
}
