//! Google Cloud Vision label detection.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use funil_core::{
    config::VisionConfig,
    error::FunilError,
    traits::{ImageLabel, Vision},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub struct GoogleVision {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    max_results: usize,
}

impl GoogleVision {
    pub fn from_config(config: &VisionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            max_results: config.max_labels,
        }
    }
}

#[derive(Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Serialize)]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    max_results: usize,
}

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    label_annotations: Vec<LabelAnnotation>,
    error: Option<StatusError>,
}

#[derive(Deserialize)]
struct LabelAnnotation {
    description: String,
    #[serde(default)]
    score: f64,
}

#[derive(Deserialize)]
struct StatusError {
    #[serde(default)]
    message: String,
}

#[async_trait]
impl Vision for GoogleVision {
    fn name(&self) -> &str {
        "google-vision"
    }

    async fn labels(&self, image: &[u8]) -> Result<Vec<ImageLabel>, FunilError> {
        let body = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: STANDARD.encode(image),
                },
                features: vec![Feature {
                    kind: "LABEL_DETECTION",
                    max_results: self.max_results,
                }],
            }],
        };

        let url = format!("{}/images:annotate", self.base_url.trim_end_matches('/'));
        debug!("vision: POST {url} ({} bytes)", image.len());

        let resp = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| FunilError::Provider(format!("vision request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(FunilError::Provider(format!(
                "vision returned {status}: {text}"
            )));
        }

        let parsed: AnnotateResponse = resp
            .json()
            .await
            .map_err(|e| FunilError::Provider(format!("vision: failed to parse response: {e}")))?;

        let first = parsed
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| FunilError::Provider("vision: empty response".into()))?;

        if let Some(err) = first.error {
            return Err(FunilError::Provider(format!("vision: {}", err.message)));
        }

        Ok(first
            .label_annotations
            .into_iter()
            .map(|l| ImageLabel {
                description: l.description,
                score: l.score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn vision(base_url: &str) -> GoogleVision {
        GoogleVision::from_config(&VisionConfig {
            api_key: "gv-test".into(),
            base_url: base_url.to_string(),
            max_labels: 5,
        })
    }

    #[tokio::test]
    async fn test_labels_request_and_parse() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images:annotate"))
            .and(query_param("key", "gv-test"))
            .and(body_partial_json(json!({
                "requests": [{
                    "image": {"content": "AQID"},
                    "features": [{"type": "LABEL_DETECTION", "maxResults": 5}]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "responses": [{
                    "labelAnnotations": [
                        {"description": "Cat", "score": 0.97},
                        {"description": "Table", "score": 0.88}
                    ]
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let labels = vision(&server.uri()).labels(&[1, 2, 3]).await.unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].description, "Cat");
        assert!((labels[1].score - 0.88).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_no_labels_is_empty_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"responses": [{}]})))
            .mount(&server)
            .await;

        let labels = vision(&server.uri()).labels(b"img").await.unwrap();
        assert!(labels.is_empty());
    }

    #[tokio::test]
    async fn test_per_image_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "responses": [{"error": {"code": 3, "message": "Bad image data."}}]
            })))
            .mount(&server)
            .await;

        let err = vision(&server.uri()).labels(b"x").await.unwrap_err();
        assert!(err.to_string().contains("Bad image data."), "got: {err}");
    }

    #[tokio::test]
    async fn test_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let err = vision(&server.uri()).labels(b"x").await.unwrap_err();
        assert!(err.to_string().contains("403"), "got: {err}");
    }
}
