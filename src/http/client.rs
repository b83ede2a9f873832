//! JSON-over-GET client
//!
//! Everything the catalog sends is a GET with query parameters whose body is
//! JSON. Transient failures (429, 5xx gateway errors, timeouts, refused
//! connections) are retried with backoff; a 429 waits for `Retry-After`.

use super::throttle::{RateLimit, Throttle};
use crate::error::{Error, Result};
use crate::types::BackoffType;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Seconds to wait after a 429 that carries no usable `Retry-After`
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Delay schedule between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub kind: BackoffType,
    pub initial: Duration,
    pub max: Duration,
}

impl Backoff {
    /// Delay before retry number `attempt` (zero-based), capped at `max`
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay = match self.kind {
            BackoffType::Constant => self.initial,
            BackoffType::Linear => self.initial.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => self.initial.saturating_mul(2u32.saturating_pow(attempt)),
        };
        delay.min(self.max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            kind: BackoffType::Exponential,
            initial: Duration::from_millis(100),
            max: Duration::from_secs(10),
        }
    }
}

/// Settings for [`HttpClient`]
#[derive(Debug, Clone, PartialEq)]
pub struct HttpClientConfig {
    /// Every request path is joined onto this
    pub base_url: String,
    pub timeout: Duration,
    /// Extra attempts after the first for transient failures
    pub max_retries: u32,
    pub backoff: Backoff,
    /// Client-side request budget; `None` sends as fast as asked
    pub rate_limit: Option<RateLimit>,
    pub user_agent: String,
}

impl HttpClientConfig {
    /// Defaults for talking to `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            backoff: Backoff::default(),
            rate_limit: Some(RateLimit::default()),
            user_agent: format!("catalog-pager/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Outcome of one attempt
enum Attempt {
    Done(String),
    Transient { error: Error, wait: Option<Duration> },
    Failed(Error),
}

/// HTTP client for the catalog API
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    throttle: Option<Throttle>,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        let throttle = config.rate_limit.map(Throttle::new);

        Ok(Self {
            client,
            config,
            throttle,
        })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Absolute URL for a path relative to the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// GET `path` with `query` and decode the JSON body
    ///
    /// Non-success statuses come back as [`Error::HttpStatus`] carrying the
    /// response body. A body that is not the expected JSON is
    /// [`Error::Decode`].
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        let body = self.fetch_text(&url, query).await?;
        serde_json::from_str(&body)
            .map_err(|e| Error::decode(format!("{e} in response from {}", url.path())))
    }

    async fn fetch_text(&self, url: &Url, query: &[(&str, String)]) -> Result<String> {
        let attempts = self.config.max_retries.saturating_add(1);
        let mut attempt = 0;

        loop {
            if let Some(throttle) = &self.throttle {
                throttle.acquire().await;
            }

            let (error, wait) = match self.attempt(url, query).await {
                Attempt::Done(body) => {
                    debug!(url = %url.path(), attempt, "request succeeded");
                    return Ok(body);
                }
                Attempt::Failed(error) => return Err(error),
                Attempt::Transient { error, wait } => (error, wait),
            };

            if attempt + 1 >= attempts {
                return Err(error);
            }
            let delay = wait.unwrap_or_else(|| self.config.backoff.delay(attempt));
            warn!(
                url = %url.path(),
                attempt = attempt + 1,
                attempts,
                error = %error,
                ?delay,
                "transient request failure, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt(&self, url: &Url, query: &[(&str, String)]) -> Attempt {
        let response = match self.client.get(url.clone()).query(query).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Attempt::Transient {
                    error: Error::Timeout {
                        timeout_ms: self.config.timeout.as_millis() as u64,
                    },
                    wait: None,
                };
            }
            Err(e) if e.is_connect() => {
                return Attempt::Transient {
                    error: Error::Http(e),
                    wait: None,
                };
            }
            Err(e) => return Attempt::Failed(Error::Http(e)),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let seconds = retry_after(&response);
            return Attempt::Transient {
                error: Error::RateLimited {
                    retry_after_seconds: seconds,
                },
                wait: Some(Duration::from_secs(seconds)),
            };
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Attempt::Failed(Error::Http(e)),
        };
        if status.is_success() {
            return Attempt::Done(body);
        }

        let error = Error::http_status(status.as_u16(), body);
        if matches!(status.as_u16(), 500 | 502 | 503 | 504) {
            Attempt::Transient { error, wait: None }
        } else {
            Attempt::Failed(error)
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}
