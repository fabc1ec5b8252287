//! HTTP client for the vendor portal
//!
//! A reqwest client with a cookie store (the login session lives there) and
//! a shared rate limiter. Responses are returned as text or bytes; HTML is
//! parsed by the callers so that no `scraper::Html` crosses an await point.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{header::CONTENT_TYPE, Client, ClientBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use url::Url;

use crate::domain::services::{Download, FetchError, FormResponse, PageFetcher};
use crate::infrastructure::config::defaults;

/// Configuration for HTTP client behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Maximum requests per second to avoid overwhelming the portal
    pub max_requests_per_second: u32,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Whether to follow redirects
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
            follow_redirects: true,
        }
    }
}

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// HTTP client with a session cookie jar and rate limiting
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    rate_limiter: Arc<DirectRateLimiter>,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.max_requests_per_second)
                .context("Rate limit must be greater than 0")?,
        );

        Ok(Self {
            client,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            config,
        })
    }

    async fn throttle(&self) {
        self.rate_limiter.until_ready().await;
        debug!("⚖️ [rate-limit] {} RPS", self.config.max_requests_per_second);
    }

    fn checked_url(url: &str) -> Result<Url, FetchError> {
        Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    fn network_error(url: &str, err: &reqwest::Error) -> FetchError {
        FetchError::Network {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    /// GET with rate limiting; non-success statuses are errors
    async fn get_success(&self, url: &str) -> Result<Response, FetchError> {
        let target = Self::checked_url(url)?;
        self.throttle().await;

        info!("🌐 HTTP GET: {}", url);
        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| Self::network_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            error!("❌ HTTP error {}: {}", status, url);
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self.get_success(url).await?;
        let body = response
            .text()
            .await
            .map_err(|e| Self::network_error(url, &e))?;

        if body.is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }

    async fn submit_form(
        &self,
        url: &str,
        fields: &[(String, String)],
    ) -> Result<FormResponse, FetchError> {
        let target = Self::checked_url(url)?;
        self.throttle().await;

        info!("🌐 HTTP POST (form, {} fields): {}", fields.len(), url);
        let response = self
            .client
            .post(target)
            .form(fields)
            .send()
            .await
            .map_err(|e| Self::network_error(url, &e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| Self::network_error(url, &e))?;

        debug!("Form response {} from {}", status, final_url);
        Ok(FormResponse {
            status,
            final_url,
            body,
        })
    }

    async fn download(&self, url: &str) -> Result<Download, FetchError> {
        let response = self.get_success(url).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Self::network_error(url, &e))?;

        Ok(Download {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}
