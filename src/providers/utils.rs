use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

use crate::error::ProviderError;

const USER_AGENT: &str = concat!("grocery-lens/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for provider adapters; every call is bounded by `timeout`.
pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

pub fn map_send_error(err: reqwest::Error, timeout: Duration) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(timeout)
    } else {
        ProviderError::Network(err.to_string())
    }
}

/// Turns a non-success response into the matching provider error.
pub async fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Unauthenticated(body),
        _ => ProviderError::Status(status.as_u16(), body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_builds() {
        assert!(http_client(Duration::from_secs(1)).is_ok());
    }
}
