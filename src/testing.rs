//! Recording mocks shared by the binary's unit tests.

use async_trait::async_trait;
use funil_core::{
    context::Context,
    error::FunilError,
    message::{Attachment, IncomingMessage, OutgoingMessage},
    traits::{Analyzer, Channel, Entity, ImageLabel, Provider, Sentiment, Transcriber, Vision},
};
use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Completion provider that answers with a fixed text (or fails) and counts calls.
pub struct MockProvider {
    reply: Option<String>,
    pub calls: Arc<AtomicUsize>,
    pub contexts: Arc<Mutex<Vec<Context>>>,
}

impl MockProvider {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
            contexts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: Arc::new(AtomicUsize::new(0)),
            contexts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn requires_api_key(&self) -> bool {
        false
    }

    async fn complete(&self, context: &Context) -> Result<OutgoingMessage, FunilError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().unwrap().push(context.clone());
        match &self.reply {
            Some(text) => Ok(OutgoingMessage {
                text: text.clone(),
                ..Default::default()
            }),
            None => Err(FunilError::Provider("openai returned 500".into())),
        }
    }

    async fn is_available(&self) -> bool {
        true
    }
}

/// Analyzer with canned answers.
pub struct MockAnalyzer {
    pub fail: bool,
}

impl MockAnalyzer {
    fn check(&self) -> Result<(), FunilError> {
        if self.fail {
            Err(FunilError::Provider("huggingface returned 503".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn sentiment(&self, _text: &str) -> Result<Sentiment, FunilError> {
        self.check()?;
        Ok(Sentiment {
            label: "positive".into(),
            score: 0.93,
        })
    }

    async fn translate(&self, _text: &str) -> Result<String, FunilError> {
        self.check()?;
        Ok("Bom dia".into())
    }

    async fn entities(&self, _text: &str) -> Result<Vec<Entity>, FunilError> {
        self.check()?;
        Ok(vec![
            Entity {
                word: "João".into(),
                group: "PER".into(),
                score: 0.99,
            },
            Entity {
                word: "São Paulo".into(),
                group: "LOC".into(),
                score: 0.98,
            },
        ])
    }

    async fn summarize(&self, _text: &str) -> Result<String, FunilError> {
        self.check()?;
        Ok("Texto curto.".into())
    }
}

/// Vision service returning fixed labels in the given order.
pub struct MockVision {
    pub labels: Vec<(&'static str, f64)>,
    pub fail: bool,
}

#[async_trait]
impl Vision for MockVision {
    fn name(&self) -> &str {
        "mock"
    }

    async fn labels(&self, _image: &[u8]) -> Result<Vec<ImageLabel>, FunilError> {
        if self.fail {
            return Err(FunilError::Provider("vision returned 403".into()));
        }
        Ok(self
            .labels
            .iter()
            .map(|(d, s)| ImageLabel {
                description: d.to_string(),
                score: *s,
            })
            .collect())
    }
}

/// Transcriber that records the path it was handed and whether the file
/// existed at call time.
pub struct MockTranscriber {
    pub transcript: Option<String>,
    pub seen: Arc<Mutex<Vec<(PathBuf, bool)>>>,
}

impl MockTranscriber {
    pub fn new(transcript: Option<&str>) -> Self {
        Self {
            transcript: transcript.map(str::to_string),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcribe(&self, path: &Path, _mime_type: &str) -> Result<String, FunilError> {
        self.seen
            .lock()
            .unwrap()
            .push((path.to_path_buf(), path.exists()));
        self.transcript
            .clone()
            .ok_or_else(|| FunilError::Provider("deepgram returned 401".into()))
    }
}

/// A mock channel that records sent messages for assertion.
pub struct MockChannel {
    name: String,
    pub sent: Arc<Mutex<Vec<OutgoingMessage>>>,
    /// Platform ids of the messages a typing indicator was sent for.
    pub typing: Arc<Mutex<Vec<Option<String>>>>,
    /// When true, `send()` returns an error (simulates delivery failure).
    pub fail_send: bool,
}

impl MockChannel {
    pub fn new(name: &str) -> (Self, Arc<Mutex<Vec<OutgoingMessage>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                name: name.to_string(),
                sent: Arc::clone(&sent),
                typing: Arc::new(Mutex::new(Vec::new())),
                fail_send: false,
            },
            sent,
        )
    }

    pub fn new_failing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sent: Arc::new(Mutex::new(Vec::new())),
            typing: Arc::new(Mutex::new(Vec::new())),
            fail_send: true,
        }
    }
}

#[async_trait]
impl Channel for MockChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, FunilError> {
        let (_tx, rx) = tokio::sync::mpsc::channel(1);
        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), FunilError> {
        if self.fail_send {
            return Err(FunilError::Channel("connection reset".to_string()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn send_typing(&self, incoming: &IncomingMessage) -> Result<(), FunilError> {
        self.typing.lock().unwrap().push(incoming.platform_id.clone());
        Ok(())
    }

    async fn download_media(&self, attachment: &Attachment) -> Result<Vec<u8>, FunilError> {
        attachment
            .data
            .clone()
            .ok_or_else(|| FunilError::Channel("media expired".into()))
    }

    async fn stop(&self) -> Result<(), FunilError> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
