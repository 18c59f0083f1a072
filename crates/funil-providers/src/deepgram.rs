//! Deepgram speech-to-text.

use async_trait::async_trait;
use funil_core::{config::SpeechConfig, error::FunilError, traits::Transcriber};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

pub struct DeepgramTranscriber {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl DeepgramTranscriber {
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        }
    }
}

#[derive(Deserialize)]
struct ListenResponse {
    results: ListenResults,
}

#[derive(Deserialize)]
struct ListenResults {
    #[serde(default)]
    channels: Vec<ListenChannel>,
}

#[derive(Deserialize)]
struct ListenChannel {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

#[async_trait]
impl Transcriber for DeepgramTranscriber {
    fn name(&self) -> &str {
        "deepgram"
    }

    async fn transcribe(&self, path: &Path, mime_type: &str) -> Result<String, FunilError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_type)
            .map_err(|e| FunilError::Provider(format!("deepgram mime error: {e}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = format!("{}/listen", self.base_url.trim_end_matches('/'));
        debug!("deepgram: POST {url} ({mime_type})");

        let resp = self
            .client
            .post(&url)
            .query(&[("language", &self.language)])
            .header("Authorization", format!("Token {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| FunilError::Provider(format!("deepgram request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(FunilError::Provider(format!(
                "deepgram returned {status}: {body}"
            )));
        }

        let parsed: ListenResponse = resp
            .json()
            .await
            .map_err(|e| FunilError::Provider(format!("deepgram: failed to parse response: {e}")))?;

        parsed
            .results
            .channels
            .into_iter()
            .next()
            .and_then(|c| c.alternatives.into_iter().next())
            .map(|a| a.transcript.trim().to_string())
            .ok_or_else(|| FunilError::Provider("deepgram: no transcript in response".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transcriber(base_url: &str) -> DeepgramTranscriber {
        DeepgramTranscriber::from_config(&SpeechConfig {
            api_key: "dg-test".into(),
            base_url: base_url.to_string(),
            language: "pt-BR".into(),
        })
    }

    fn audio_file() -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".ogg").tempfile().unwrap();
        std::fs::write(file.path(), b"OggS fake audio").unwrap();
        file
    }

    #[tokio::test]
    async fn test_transcribe_uses_token_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/listen"))
            .and(query_param("language", "pt-BR"))
            .and(header("authorization", "Token dg-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": {"channels": [{"alternatives": [
                    {"transcript": " quero saber sobre hemogotas ", "confidence": 0.98}
                ]}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let file = audio_file();
        let text = transcriber(&server.uri())
            .transcribe(file.path(), "audio/ogg")
            .await
            .unwrap();
        assert_eq!(text, "quero saber sobre hemogotas");
    }

    #[tokio::test]
    async fn test_missing_transcript_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"results": {"channels": []}})),
            )
            .mount(&server)
            .await;

        let file = audio_file();
        let err = transcriber(&server.uri())
            .transcribe(file.path(), "audio/ogg")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no transcript"), "got: {err}");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = transcriber("http://127.0.0.1:9")
            .transcribe(Path::new("/nonexistent/__funil_audio__.ogg"), "audio/ogg")
            .await
            .unwrap_err();
        assert!(matches!(err, FunilError::Io(_)));
    }
}
