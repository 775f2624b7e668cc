//! HTTP client for the response store
//!
//! Every request carries the configured timeout so a stalled store cannot
//! hold a refresh past the next tick.

use std::time::Duration;

use async_trait::async_trait;
use lcx_common::{NewSurveyResponse, SurveyResponse};
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

const USER_AGENT: &str = concat!("lcx-dv/", env!("CARGO_PKG_VERSION"));

/// Shown to the user whenever a submission cannot be written
pub const SUBMIT_FAILURE_NOTICE: &str =
    "There was a problem submitting your profile. Please try again.";

/// Store client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid store URL {0}: {1}")]
    InvalidUrl(String, String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Store returned {0}: {1}")]
    Store(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Anything the refresh loop can pull the full response collection from
#[async_trait]
pub trait ResponseSource: Send + Sync + 'static {
    async fn fetch_responses(&self) -> Result<Vec<SurveyResponse>>;
}

/// Response store API client
#[derive(Debug, Clone)]
pub struct StoreClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl StoreClient {
    pub fn new(store_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(store_url)
            .map_err(|e| ClientError::InvalidUrl(store_url.to_string(), e.to_string()))?;

        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(
                store_url.to_string(),
                "not a base URL".to_string(),
            ));
        }

        // Url::join replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(path.to_string(), e.to_string()))
    }

    /// GET /responses
    pub async fn list_responses(&self) -> Result<Vec<SurveyResponse>> {
        let url = self.endpoint("responses")?;
        tracing::debug!(url = %url, "Fetching responses");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::Store(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// POST /responses; returns the stored record with its new id
    pub async fn submit(&self, submission: &NewSurveyResponse) -> Result<SurveyResponse> {
        let url = self.endpoint("responses")?;

        let response = self
            .http_client
            .post(url)
            .json(submission)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::Store(status.as_u16(), error_text));
        }

        let stored: SurveyResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        tracing::info!(id = stored.id, name = %stored.name, "Profile submitted");
        Ok(stored)
    }
}

#[async_trait]
impl ResponseSource for StoreClient {
    async fn fetch_responses(&self) -> Result<Vec<SurveyResponse>> {
        self.list_responses().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(4000);

    #[test]
    fn test_client_creation() {
        let client = StoreClient::new("http://127.0.0.1:3001", TIMEOUT).unwrap();
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:3001/");
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let client = StoreClient::new("http://survey.local/lcx", TIMEOUT).unwrap();
        assert_eq!(
            client.endpoint("responses").unwrap().as_str(),
            "http://survey.local/lcx/responses"
        );
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            StoreClient::new("not a url", TIMEOUT),
            Err(ClientError::InvalidUrl(..))
        ));
        assert!(matches!(
            StoreClient::new("mailto:someone@example.com", TIMEOUT),
            Err(ClientError::InvalidUrl(..))
        ));
    }
}
