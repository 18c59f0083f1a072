//! Service factory. Builds the external AI clients from config.

use funil_core::{
    config,
    traits::{Analyzer, Provider, Transcriber, Vision},
};
use funil_providers::{DeepgramTranscriber, GoogleVision, HuggingFaceAnalyzer, OpenAiProvider};
use std::sync::Arc;
use tracing::warn;

/// The external services the gateway talks to.
pub struct Services {
    pub provider: Arc<dyn Provider>,
    pub analyzer: Arc<dyn Analyzer>,
    pub vision: Arc<dyn Vision>,
    pub transcriber: Arc<dyn Transcriber>,
}

/// Build every client. Only the completion key is mandatory; the other
/// services degrade to their apology replies when their key is missing.
pub fn build_services(cfg: &config::Config) -> anyhow::Result<Services> {
    let p = &cfg.provider;
    if p.openai.api_key.is_empty() {
        anyhow::bail!(
            "provider.openai.api_key is empty. Set it in config.toml or the OPENAI_API_KEY env var."
        );
    }
    if p.huggingface.api_token.is_empty() {
        warn!("HUGGINGFACE_API_TOKEN not set: analysis commands will fail");
    }
    if p.vision.api_key.is_empty() {
        warn!("GOOGLE_VISION_API_KEY not set: image messages will fail");
    }
    if p.speech.api_key.is_empty() {
        warn!("DEEPGRAM_API_KEY not set: voice messages will fail");
    }

    Ok(Services {
        provider: Arc::new(OpenAiProvider::from_config(&p.openai)),
        analyzer: Arc::new(HuggingFaceAnalyzer::from_config(&p.huggingface)),
        vision: Arc::new(GoogleVision::from_config(&p.vision)),
        transcriber: Arc::new(DeepgramTranscriber::from_config(&p.speech)),
    })
}
