use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::models::{ImageHandle, ProviderKind, RecognitionCandidate};
use crate::providers::traits::ClassificationProvider;
use crate::providers::utils::{check_status, http_client, map_send_error};

const MAX_WEB_ENTITIES: u32 = 10;

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    web_detection: Option<WebDetection>,
    error: Option<AnnotateError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebDetection {
    #[serde(default)]
    web_entities: Vec<WebEntity>,
}

#[derive(Debug, Deserialize)]
struct WebEntity {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct AnnotateError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

/// Web-entity detection through the Cloud Vision `images:annotate` endpoint.
#[derive(Clone)]
pub struct GoogleVisionProvider {
    api_key: Option<String>,
    api_url: String,
    client: Client,
    timeout: Duration,
}

impl GoogleVisionProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            client: http_client(config.timeout)?,
            timeout: config.timeout,
        })
    }

    /// Entities in the order Vision ranks them, empty descriptions included.
    fn parse_entities(body: AnnotateResponse) -> Result<Vec<RecognitionCandidate>, ProviderError> {
        let first = body
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Malformed("empty responses array".to_string()))?;

        if let Some(error) = first.error {
            return Err(ProviderError::Status(error.code, error.message));
        }

        Ok(first
            .web_detection
            .map(|d| d.web_entities)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(rank, entity)| {
                RecognitionCandidate::new(ProviderKind::WebEntity, entity.description, Some(rank as u32))
            })
            .collect())
    }
}

#[async_trait]
impl ClassificationProvider for GoogleVisionProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::WebEntity
    }

    async fn classify(&self, image: &ImageHandle) -> Result<Vec<RecognitionCandidate>, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Unauthenticated("GOOGLE_VISION_API_KEY not set".to_string()))?;

        let bytes = image
            .read_bytes()
            .await
            .map_err(|e| ProviderError::Image(e.to_string()))?;

        let response = self
            .client
            .post(format!("{}/images:annotate", self.api_url))
            .query(&[("key", api_key)])
            .json(&json!({
                "requests": [{
                    "image": { "content": STANDARD.encode(&bytes) },
                    "features": [{ "type": "WEB_DETECTION", "maxResults": MAX_WEB_ENTITIES }]
                }]
            }))
            .send()
            .await
            .map_err(|e| map_send_error(e, self.timeout))?;

        let body: AnnotateResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let candidates = Self::parse_entities(body)?;
        tracing::debug!(entities = candidates.len(), "Vision web detection complete");
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<Vec<RecognitionCandidate>, ProviderError> {
        GoogleVisionProvider::parse_entities(serde_json::from_str(raw).unwrap())
    }

    #[test]
    fn test_parse_entities_keeps_rank_order() {
        let candidates = parse(
            r#"{"responses":[{"webDetection":{"webEntities":[
                {"entityId":"/m/09qck","score":0.91,"description":"Banana"},
                {"entityId":"/m/0x","score":0.5},
                {"entityId":"/m/02wbm","score":0.42,"description":"Food"}
            ]}}]}"#,
        )
        .unwrap();

        let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["Banana", "", "Food"]);
        assert_eq!(candidates[2].rank, Some(2));
        assert!(candidates.iter().all(|c| c.source == ProviderKind::WebEntity));
    }

    #[test]
    fn test_parse_entities_without_detection_is_empty() {
        assert!(parse(r#"{"responses":[{}]}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_entities_surfaces_inline_error() {
        let err = parse(r#"{"responses":[{"error":{"code":7,"message":"denied"}}]}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Status(7, _)));
    }

    #[tokio::test]
    async fn test_missing_key_is_provider_error() {
        let config = ProviderConfig {
            api_key: None,
            api_url: "https://vision.googleapis.com/v1".to_string(),
            model: None,
            timeout: Duration::from_secs(1),
        };
        let provider = GoogleVisionProvider::new(&config).unwrap();
        let err = provider.classify(&ImageHandle::new("missing.jpg")).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unauthenticated(_)));
    }
}
