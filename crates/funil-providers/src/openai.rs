//! OpenAI-compatible text completion provider.
//!
//! Uses the legacy `/completions` endpoint: the conversation is flattened
//! into a single prompt string.

use async_trait::async_trait;
use funil_core::{
    config::OpenAiConfig,
    context::Context,
    error::FunilError,
    message::{MessageMetadata, OutgoingMessage},
    traits::Provider,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

/// Reply used when the endpoint answers without any choice.
const EMPTY_COMPLETION: &str = "Desculpe, não entendi sua solicitação.";

/// OpenAI-compatible completion provider.
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiProvider {
    /// Create from config values.
    pub fn from_config(config: &OpenAiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: String,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Option<Vec<CompletionChoice>>,
    model: Option<String>,
    usage: Option<CompletionUsage>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: Option<String>,
}

#[derive(Deserialize)]
struct CompletionUsage {
    total_tokens: Option<u64>,
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn requires_api_key(&self) -> bool {
        true
    }

    async fn complete(&self, context: &Context) -> Result<OutgoingMessage, FunilError> {
        let start = Instant::now();
        let body = CompletionRequest {
            model: &self.model,
            prompt: context.to_prompt_string(),
            max_tokens: context.max_tokens.unwrap_or(self.max_tokens),
        };

        let url = format!("{}/completions", self.base_url.trim_end_matches('/'));
        debug!("openai: POST {url} model={}", self.model);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| FunilError::Provider(format!("openai request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(FunilError::Provider(format!(
                "openai returned {status}: {text}"
            )));
        }

        let parsed: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| FunilError::Provider(format!("openai: failed to parse response: {e}")))?;

        let text = parsed
            .choices
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.text.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(EMPTY_COMPLETION)
            .to_string();

        Ok(OutgoingMessage {
            text,
            metadata: MessageMetadata {
                provider_used: "openai".to_string(),
                tokens_used: parsed.usage.and_then(|u| u.total_tokens),
                processing_time_ms: start.elapsed().as_millis() as u64,
                model: parsed.model,
            },
            reply_target: None,
        })
    }

    async fn is_available(&self) -> bool {
        if self.api_key.is_empty() {
            warn!("openai: no API key configured");
            return false;
        }
        let url = format!("{}/models", self.base_url.trim_end_matches('/'));
        match self.client.get(&url).bearer_auth(&self.api_key).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("openai not available: {e}");
                false
            }
        }
    }
}
