//! Timeout-bounded GET with bounded retry, plus the endpoint rotation state.
//!
//! The [`Fetcher`] performs one logical request: each attempt runs under a
//! deadline, transient failures ([`Error::is_recoverable`]) are retried with a
//! linear backoff of `retry_delay * attempt`, and everything else surfaces at
//! once. Endpoint rotation is not done here; the caller owns an
//! [`EndpointState`] and rotates it after a request ultimately fails.

use crate::config::ApiConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl TransportResponse {
    /// Convenience constructor.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Issues a single GET. Implementations do not retry or enforce deadlines.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url`, returning whatever status the server answered with.
    ///
    /// Only transport-level failures are errors; a 404 or 500 is a response.
    async fn get(&self, url: &str) -> Result<TransportResponse>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build the HTTP client with compression and a JSON `Accept` header.
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(concat!("quran-core/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

/// Deadline and retry budget for one logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Deadline for each attempt.
    pub timeout: Duration,
    /// Extra attempts after the first for recoverable failures.
    pub max_retries: u32,
    /// Base delay; attempt `n` waits `retry_delay * n` before retrying.
    pub retry_delay: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for FetchPolicy {
    fn from(api: &ApiConfig) -> Self {
        Self {
            timeout: api.timeout(),
            max_retries: api.max_retries,
            retry_delay: api.retry_delay(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// Validate an upstream envelope and return its `data`.
///
/// ```rust
/// use quran_core::fetcher::parse_envelope;
///
/// let data = parse_envelope(r#"{"code":200,"status":"OK","data":[1,2]}"#)?;
/// assert_eq!(data, serde_json::json!([1, 2]));
/// assert!(parse_envelope(r#"{"code":400,"data":"bad"}"#).is_err());
/// # Ok::<(), quran_core::Error>(())
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidResponse`] when the body is not a JSON envelope,
/// `code` is not 200, or `data` is missing or null.
pub fn parse_envelope(body: &str) -> Result<Value> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| Error::InvalidResponse(format!("body is not a JSON envelope: {e}")))?;

    if envelope.code != 200 {
        return Err(Error::InvalidResponse(format!(
            "envelope code {} ({})",
            envelope.code,
            envelope.status.as_deref().unwrap_or("no status")
        )));
    }

    envelope
        .data
        .ok_or_else(|| Error::InvalidResponse("envelope has no data".into()))
}

/// Runs requests through a [`Transport`] under a [`FetchPolicy`].
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    policy: FetchPolicy,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Fetcher {
    /// Create a fetcher over an arbitrary transport.
    pub fn new(transport: Arc<dyn Transport>, policy: FetchPolicy) -> Self {
        Self { transport, policy }
    }

    /// Create a fetcher over a fresh [`HttpTransport`].
    pub fn http(policy: FetchPolicy) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new()?), policy))
    }

    /// Active policy.
    #[must_use]
    pub const fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Fetch `url` and return the envelope's `data`, retrying transient
    /// failures.
    ///
    /// # Errors
    ///
    /// Returns the last error once the retry budget is exhausted, or the
    /// first non-recoverable error.
    pub async fn fetch_data(&self, url: &str) -> Result<Value> {
        let mut attempt = 0u32;
        loop {
            match self.attempt(url).await {
                Ok(data) => {
                    if attempt > 0 {
                        info!("{url} succeeded after {attempt} retries");
                    }
                    return Ok(data);
                },
                Err(err) if err.is_recoverable() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    let delay = self.policy.retry_delay * attempt;
                    warn!(
                        "{} fetching {url}: {err}; retry {attempt}/{} in {delay:?}",
                        err.category(),
                        self.policy.max_retries
                    );
                    tokio::time::sleep(delay).await;
                },
                Err(err) => return Err(err),
            }
        }
    }

    async fn attempt(&self, url: &str) -> Result<Value> {
        debug!("GET {url}");
        let response = tokio::time::timeout(self.policy.timeout, self.transport.get(url))
            .await
            .map_err(|_| {
                Error::Timeout(format!(
                    "no response from {url} within {}ms",
                    self.policy.timeout.as_millis()
                ))
            })??;

        if !response.is_success() {
            return Err(Error::HttpError {
                status: response.status,
            });
        }

        parse_envelope(&response.body)
    }
}

/// Ordered base URLs with the active one and its failure streak.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointState {
    endpoints: Vec<String>,
    active: usize,
    consecutive_failures: u32,
}

impl EndpointState {
    /// Build from a primary URL followed by fallbacks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `endpoints` is empty.
    pub fn new(endpoints: Vec<String>) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(Error::Config("at least one API endpoint is required".into()));
        }
        Ok(Self {
            endpoints,
            active: 0,
            consecutive_failures: 0,
        })
    }

    /// Base URL requests should currently go to.
    #[must_use]
    pub fn active(&self) -> &str {
        &self.endpoints[self.active]
    }

    /// Index of the active endpoint.
    #[must_use]
    pub const fn active_index(&self) -> usize {
        self.active
    }

    /// All configured endpoints, primary first.
    #[must_use]
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Failures recorded against the active endpoint since the last success
    /// or rotation.
    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Reset the failure streak.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Count a failed request and return the new streak length.
    pub fn record_failure(&mut self) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures
    }

    /// Advance to the next endpoint, wrapping, and reset the failure streak.
    pub fn rotate(&mut self) -> &str {
        self.active = (self.active + 1) % self.endpoints.len();
        self.consecutive_failures = 0;
        info!("switched to endpoint {}", self.endpoints[self.active]);
        &self.endpoints[self.active]
    }
}
