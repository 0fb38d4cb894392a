// src/services/feed_client.rs

//! Single-request feed client with bounded retry.

use reqwest::{Client, StatusCode};

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;
use crate::utils::RetryPolicy;
use crate::utils::http::create_async_client;

/// Raw response of one feed request. Error statuses are kept as-is.
#[derive(Debug, Clone)]
pub struct FeedResponse {
    pub status: StatusCode,
    pub body: String,
}

impl FeedResponse {
    /// Body of a successful response, or a status error naming `uri`.
    pub fn into_body(self, uri: &str) -> Result<String> {
        if self.status.is_success() {
            Ok(self.body)
        } else {
            Err(AppError::Status {
                uri: uri.to_string(),
                status: self.status.as_u16(),
            })
        }
    }
}

/// HTTP GET with a stable user agent, request timeout and retry policy.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    retry: RetryPolicy,
}

impl FeedClient {
    /// Create a client from crawler settings.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            retry: RetryPolicy::from_config(config),
        })
    }

    pub fn with_client(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Fetch `uri`, retrying connect failures and timeouts only.
    pub async fn get(&self, uri: &str) -> Result<FeedResponse> {
        let client = &self.client;
        self.retry
            .run(uri, |attempt| async move {
                log::debug!("GET {uri} (attempt {attempt})");
                let response = client.get(uri).send().await?;
                let status = response.status();
                let body = response.text().await?;
                Ok(FeedResponse { status, body })
            })
            .await
    }
}
