//! HTTP client utilities.
//!
//! The catalog sits behind bot detection, so every request carries the headers
//! of a desktop browser's top-level navigation and the client keeps a cookie
//! jar for the lifetime of the process.

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::sources::SourceError;
use crate::utils::retry::{with_retry_detailed, RetryConfig, RetryResult, TransientError};

/// One GET against the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Target URL without query string
    pub url: String,
    /// Query parameters, in order
    pub query: Vec<(String, String)>,
    /// Per-attempt timeout
    pub timeout: Duration,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            timeout,
        }
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// What a fetch produced when it did not fail fatally
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response body
    Document(String),
    /// Every attempt was throttled; callers treat this as "no data"
    Throttled { attempts: u32 },
}

impl FetchOutcome {
    /// The body, if any
    pub fn into_document(self) -> Option<String> {
        match self {
            FetchOutcome::Document(body) => Some(body),
            FetchOutcome::Throttled { .. } => None,
        }
    }
}

/// Shared HTTP client with browser-like defaults and a cookie session
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, SourceError> {
        Self::from_config(&HttpConfig::default())
    }

    /// Create a client from the `[http]` configuration section
    pub fn from_config(config: &HttpConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(browser_headers(&config.accept_language)?)
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SourceError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// GET a page, backing off on 503 according to `retry`
    ///
    /// Exhausting the budget on 503 yields [`FetchOutcome::Throttled`]. Any
    /// other failure status or transport error is returned as an error on the
    /// attempt that produced it.
    pub async fn fetch(
        &self,
        request: &FetchRequest,
        retry: RetryConfig,
    ) -> Result<FetchOutcome, SourceError> {
        match with_retry_detailed(retry, || self.fetch_once(request)).await {
            RetryResult::Success(body) => Ok(FetchOutcome::Document(body)),
            RetryResult::TransientFailure(_, attempts) => {
                tracing::error!(
                    "{} still unavailable after {} attempts, returning no data",
                    request.url,
                    attempts
                );
                Ok(FetchOutcome::Throttled { attempts })
            }
            RetryResult::PermanentFailure(error) => Err(error),
        }
    }

    async fn fetch_once(&self, request: &FetchRequest) -> Result<String, SourceError> {
        let response = self
            .client
            .get(&request.url)
            .query(&request.query)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| {
                if TransientError::from_reqwest_error(&e).is_some() {
                    SourceError::ServiceUnavailable
                } else {
                    SourceError::Network(format!("Request to {} failed: {}", request.url, e))
                }
            })?;

        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(SourceError::ServiceUnavailable);
        }
        if !status.is_success() {
            tracing::debug!("{} returned status {}", request.url, status);
            return Err(SourceError::HttpStatus(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to read response body: {}", e)))
    }
}

/// Headers of a top-level navigation in a desktop browser
fn browser_headers(accept_language: &str) -> Result<HeaderMap, SourceError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_str(accept_language)
            .map_err(|e| SourceError::InvalidRequest(format!("Invalid Accept-Language: {}", e)))?,
    );
    headers.insert(header::DNT, HeaderValue::from_static("1"));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));

    for (name, value) in [
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "none"),
        ("sec-fetch-user", "?1"),
    ] {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }

    Ok(headers)
}
