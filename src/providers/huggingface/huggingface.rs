use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::models::{ImageHandle, ProviderKind, RecognitionCandidate};
use crate::providers::traits::ClassificationProvider;
use crate::providers::utils::{check_status, http_client, map_send_error};

const DEFAULT_MODEL: &str = "Salesforce/blip-image-captioning-base";

#[derive(Debug, Deserialize)]
struct GeneratedCaption {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CaptionResponse {
    Many(Vec<GeneratedCaption>),
    One(GeneratedCaption),
}

/// Image captioning through a hosted BLIP model on the Hugging Face inference API.
#[derive(Clone)]
pub struct HuggingFaceCaptionProvider {
    api_token: Option<String>,
    endpoint: String,
    client: Client,
    timeout: Duration,
}

impl HuggingFaceCaptionProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, reqwest::Error> {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        Ok(Self {
            api_token: config.api_key.clone(),
            endpoint: format!("{}/models/{}", config.api_url, model),
            client: http_client(config.timeout)?,
            timeout: config.timeout,
        })
    }

    fn parse_caption(body: CaptionResponse) -> Result<String, ProviderError> {
        let caption = match body {
            CaptionResponse::Many(captions) => captions.into_iter().next(),
            CaptionResponse::One(caption) => Some(caption),
        };
        caption
            .map(|c| c.generated_text.trim().to_string())
            .ok_or_else(|| ProviderError::Malformed("no caption generated".to_string()))
    }
}

#[async_trait]
impl ClassificationProvider for HuggingFaceCaptionProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Caption
    }

    async fn classify(&self, image: &ImageHandle) -> Result<Vec<RecognitionCandidate>, ProviderError> {
        let token = self
            .api_token
            .as_deref()
            .ok_or_else(|| ProviderError::Unauthenticated("HUGGINGFACE_API_TOKEN not set".to_string()))?;

        let bytes = image
            .read_bytes()
            .await
            .map_err(|e| ProviderError::Image(e.to_string()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| map_send_error(e, self.timeout))?;

        let body: CaptionResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let caption = Self::parse_caption(body)?;
        tracing::debug!(caption = %caption, "Caption generated");
        Ok(vec![RecognitionCandidate::new(ProviderKind::Caption, caption, None)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<String, ProviderError> {
        HuggingFaceCaptionProvider::parse_caption(serde_json::from_str(raw).unwrap())
    }

    #[test]
    fn test_parse_caption_list() {
        assert_eq!(parse(r#"[{"generated_text":"a bunch of bananas "}]"#).unwrap(), "a bunch of bananas");
    }

    #[test]
    fn test_parse_caption_object() {
        assert_eq!(parse(r#"{"generated_text":"a loaf of bread"}"#).unwrap(), "a loaf of bread");
    }

    #[test]
    fn test_parse_caption_empty_list_is_malformed() {
        assert!(matches!(parse("[]"), Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn test_endpoint_uses_configured_model() {
        let config = ProviderConfig {
            api_key: Some("hf_token".to_string()),
            api_url: "https://api-inference.huggingface.co".to_string(),
            model: None,
            timeout: Duration::from_secs(1),
        };
        let provider = HuggingFaceCaptionProvider::new(&config).unwrap();
        assert_eq!(
            provider.endpoint,
            "https://api-inference.huggingface.co/models/Salesforce/blip-image-captioning-base"
        );
    }
}
