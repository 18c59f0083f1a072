//! Hugging Face Inference API: sentiment, translation, NER, summarization.
//!
//! Each task posts `{"inputs": text}` to `{base_url}/{model}`. Response
//! shapes differ per pipeline and are read positionally.

use async_trait::async_trait;
use funil_core::{
    config::HuggingFaceConfig,
    error::FunilError,
    traits::{Analyzer, Entity, Sentiment},
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub struct HuggingFaceAnalyzer {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
    sentiment_model: String,
    translation_model: String,
    ner_model: String,
    summarization_model: String,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

impl HuggingFaceAnalyzer {
    pub fn from_config(config: &HuggingFaceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_token: config.api_token.clone(),
            sentiment_model: config.sentiment_model.clone(),
            translation_model: config.translation_model.clone(),
            ner_model: config.ner_model.clone(),
            summarization_model: config.summarization_model.clone(),
        }
    }

    async fn infer(&self, model: &str, text: &str) -> Result<Value, FunilError> {
        let url = format!("{}/{model}", self.base_url.trim_end_matches('/'));
        debug!("huggingface: POST {url}");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&InferenceRequest { inputs: text })
            .send()
            .await
            .map_err(|e| FunilError::Provider(format!("huggingface request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(FunilError::Provider(format!(
                "huggingface returned {status}: {body}"
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FunilError::Provider(format!("huggingface: failed to read response: {e}")))?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Highest-scoring label. Text-classification pipelines answer either
/// `[[{label, score}, ...]]` or `[{label, score}, ...]`.
fn parse_sentiment(value: &Value) -> Option<Sentiment> {
    let first = value.get(0)?;
    let candidates = if first.is_array() { first } else { value };
    candidates
        .as_array()?
        .iter()
        .filter_map(|c| {
            Some(Sentiment {
                label: c.get("label")?.as_str()?.to_string(),
                score: c.get("score")?.as_f64()?,
            })
        })
        .max_by(|a, b| a.score.total_cmp(&b.score))
}

/// `[{"<field>": "..."}]`, as returned by translation and summarization.
fn parse_first_text(value: &Value, field: &str) -> Option<String> {
    value
        .get(0)?
        .get(field)?
        .as_str()
        .map(|s| s.trim().to_string())
}

/// Token-classification output. Aggregated pipelines use `entity_group`,
/// raw ones `entity`.
fn parse_entities(value: &Value) -> Vec<Entity> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|e| {
                    let group = e
                        .get("entity_group")
                        .or_else(|| e.get("entity"))?
                        .as_str()?;
                    Some(Entity {
                        word: e.get("word")?.as_str()?.trim().to_string(),
                        group: group.to_string(),
                        score: e.get("score").and_then(Value::as_f64).unwrap_or(0.0),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn unexpected(task: &str, value: &Value) -> FunilError {
    FunilError::Provider(format!("huggingface {task}: unexpected response: {value}"))
}

#[async_trait]
impl Analyzer for HuggingFaceAnalyzer {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn sentiment(&self, text: &str) -> Result<Sentiment, FunilError> {
        let value = self.infer(&self.sentiment_model, text).await?;
        parse_sentiment(&value).ok_or_else(|| unexpected("sentiment", &value))
    }

    async fn translate(&self, text: &str) -> Result<String, FunilError> {
        let value = self.infer(&self.translation_model, text).await?;
        parse_first_text(&value, "translation_text").ok_or_else(|| unexpected("translation", &value))
    }

    async fn entities(&self, text: &str) -> Result<Vec<Entity>, FunilError> {
        let value = self.infer(&self.ner_model, text).await?;
        if !value.is_array() {
            return Err(unexpected("ner", &value));
        }
        Ok(parse_entities(&value))
    }

    async fn summarize(&self, text: &str) -> Result<String, FunilError> {
        let value = self.infer(&self.summarization_model, text).await?;
        parse_first_text(&value, "summary_text").ok_or_else(|| unexpected("summarization", &value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn analyzer(base_url: &str) -> HuggingFaceAnalyzer {
        HuggingFaceAnalyzer::from_config(&HuggingFaceConfig {
            api_token: "hf-test".into(),
            base_url: base_url.to_string(),
            sentiment_model: "org/sentiment".into(),
            translation_model: "org/translate".into(),
            ner_model: "org/ner".into(),
            summarization_model: "org/summary".into(),
        })
    }

    #[test]
    fn test_parse_sentiment_nested_and_flat() {
        let nested = json!([[
            {"label": "negative", "score": 0.1},
            {"label": "positive", "score": 0.85},
            {"label": "neutral", "score": 0.05}
        ]]);
        let s = parse_sentiment(&nested).unwrap();
        assert_eq!(s.label, "positive");

        let flat = json!([{"label": "neutral", "score": 0.6}, {"label": "negative", "score": 0.4}]);
        assert_eq!(parse_sentiment(&flat).unwrap().label, "neutral");

        assert!(parse_sentiment(&json!({"error": "loading"})).is_none());
    }

    #[test]
    fn test_parse_entities_accepts_both_shapes() {
        let value = json!([
            {"entity_group": "PER", "word": "João", "score": 0.99},
            {"entity": "B-LOC", "word": " São Paulo", "score": 0.97},
            {"word": "sem grupo"}
        ]);
        let entities = parse_entities(&value);
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].group, "PER");
        assert_eq!(entities[1].word, "São Paulo");
    }

    #[tokio::test]
    async fn test_sentiment_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/org/sentiment"))
            .and(header("authorization", "Bearer hf-test"))
            .and(body_json(json!({"inputs": "adorei o produto"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([[{"label": "positive", "score": 0.93}]])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let s = analyzer(&server.uri()).sentiment("adorei o produto").await.unwrap();
        assert_eq!(s.label, "positive");
        assert!((s.score - 0.93).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_translate_and_summarize() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/org/translate"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"translation_text": " Bom dia "}])),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/org/summary"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"summary_text": "Resumo curto."}])),
            )
            .mount(&server)
            .await;

        let a = analyzer(&server.uri());
        assert_eq!(a.translate("Good morning").await.unwrap(), "Bom dia");
        assert_eq!(a.summarize("texto longo").await.unwrap(), "Resumo curto.");
    }

    #[tokio::test]
    async fn test_model_loading_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(json!({"error": "Model org/ner is currently loading"})),
            )
            .mount(&server)
            .await;

        let err = analyzer(&server.uri()).entities("João").await.unwrap_err();
        assert!(err.to_string().contains("503"), "got: {err}");
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"weird": true})))
            .mount(&server)
            .await;

        let err = analyzer(&server.uri()).translate("hi").await.unwrap_err();
        assert!(err.to_string().contains("unexpected response"), "got: {err}");
    }

    #[tokio::test]
    async fn test_non_json_body_is_serialization_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let err = analyzer(&server.uri()).summarize("texto").await.unwrap_err();
        assert!(matches!(err, FunilError::Serialization(_)), "got: {err}");
    }
}
