use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::classify::GROCERY_KEYWORDS;
use crate::food::config::FoodConfig;

const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 15;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not a valid URL: {source}")]
    InvalidUrl {
        name: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: String, value: String },
}

/// Connection settings for one classification provider, read from
/// `<PREFIX>_API_KEY`, `<PREFIX>_API_URL` and `<PREFIX>_MODEL`.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: Option<String>,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn from_env(provider: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let prefix = provider.to_uppercase();

        // Google takes an API key, Hugging Face a bearer token
        let api_key = non_empty_var(&format!("{}_API_KEY", prefix))
            .or_else(|| non_empty_var(&format!("{}_API_TOKEN", prefix)));

        let api_url = env::var(format!("{}_API_URL", prefix))
            .unwrap_or_else(|_| match provider {
                "google_vision" => "https://vision.googleapis.com/v1".to_string(),
                "huggingface" => "https://api-inference.huggingface.co".to_string(),
                _ => String::new(),
            });
        let api_url = validated_url(&format!("{}_API_URL", prefix), api_url)?;

        let model = non_empty_var(&format!("{}_MODEL", prefix)).or_else(|| match provider {
            "huggingface" => Some("Salesforce/blip-image-captioning-base".to_string()),
            _ => None,
        });

        Ok(Self {
            api_key,
            api_url,
            model,
            timeout,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub web_entity: ProviderConfig,
    pub caption: ProviderConfig,
    pub food: FoodConfig,
    pub provider_timeout: Duration,
    pub max_upload_bytes: usize,
    pub keywords: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider_timeout =
            Duration::from_secs(number_var("PROVIDER_TIMEOUT_SECS", DEFAULT_PROVIDER_TIMEOUT_SECS)?);
        let max_upload_bytes = number_var("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES as u64)? as usize;

        let keywords = env::var("GROCERY_KEYWORDS")
            .map(|k| k.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_else(|_| GROCERY_KEYWORDS.iter().map(|k| k.to_string()).collect());

        Ok(Self {
            web_entity: ProviderConfig::from_env("google_vision", provider_timeout)?,
            caption: ProviderConfig::from_env("huggingface", provider_timeout)?,
            food: FoodConfig::from_env()?,
            provider_timeout,
            max_upload_bytes,
            keywords,
        })
    }
}

pub(crate) fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub(crate) fn number_var(name: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ConfigError::InvalidNumber {
                name: name.to_string(),
                value,
            }),
        Err(_) => Ok(default),
    }
}

/// Parses the URL and returns it without a trailing slash so paths can be appended.
pub(crate) fn validated_url(name: &str, value: String) -> Result<String, ConfigError> {
    Url::parse(&value).map_err(|source| ConfigError::InvalidUrl {
        name: name.to_string(),
        source,
    })?;
    Ok(value.trim_end_matches('/').to_string())
}
