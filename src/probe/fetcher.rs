//! HTTP fetcher implementation
//!
//! This module handles every HTTP request the prober makes, including:
//! - Building the HTTP client with timeouts
//! - Picking a browser user agent per request
//! - Retrying timeouts and throttling responses with capped exponential backoff
//! - Mapping status codes onto "page" / "not found" / error

use crate::config::ProbeConfig;
use crate::ProbeError;
use rand::seq::SliceRandom;
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;

/// Upper bound for a single backoff sleep (16 minutes)
pub const MAX_BACKOFF: Duration = Duration::from_secs(960);

/// Browser user agents rotated across requests
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.4; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.2478.80",
];

/// Picks a user agent uniformly at random
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Result of a successful probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 2xx response with its body
    Page(String),

    /// 404 or any other non-retryable, non-2xx status
    NotFound,
}

/// Retry budget and backoff schedule for one probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub max_retries: u32,

    /// Sleep before the first retry
    pub base_delay: Duration,

    /// Cap applied to every sleep
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay: MAX_BACKOFF,
        }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(config.max_retries, config.base_delay())
    }

    /// Sleep between attempt `retry` and attempt `retry + 1` (0-based)
    ///
    /// Equals `min(base_delay * 2^retry, max_delay)`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        2u32.checked_pow(retry)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// Builds an HTTP client with the configured timeouts
///
/// The user agent is not baked into the client; [`Fetcher`] sets a random
/// one on every request.
///
/// # Example
///
/// ```no_run
/// use chapter_scout::config::ProbeConfig;
/// use chapter_scout::probe::build_http_client;
///
/// let client = build_http_client(&ProbeConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ProbeConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Why an attempt is worth repeating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transient {
    Timeout,
    Throttled(StatusCode),
}

impl Transient {
    fn into_error(self, url: &str, attempts: u32) -> ProbeError {
        match self {
            Self::Timeout => ProbeError::Timeout {
                url: url.to_string(),
                attempts,
            },
            Self::Throttled(status) => ProbeError::Throttled {
                url: url.to_string(),
                status: status.as_u16(),
                attempts,
            },
        }
    }
}

impl fmt::Display for Transient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("Request timeout"),
            Self::Throttled(status) => write!(f, "HTTP {}", status.as_u16()),
        }
    }
}

enum Attempt {
    Done(ProbeOutcome),
    Retry(Transient),
    Failed(ProbeError),
}

/// Issues GET requests with retry and backoff
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Return the body |
/// | HTTP 404 | Immediate → NotFound |
/// | HTTP 429 / 503 | Retry with backoff |
/// | Timeout | Retry with backoff |
/// | Other non-2xx | Immediate → NotFound (logged) |
/// | Connection / TLS error | Immediate → error |
///
/// Once retries run out the last transient failure is returned as an error,
/// never as "not found".
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Builds a fetcher and its client from probe settings
    pub fn from_config(config: &ProbeConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            build_http_client(config)?,
            RetryPolicy::from_config(config),
        ))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches `url`, retrying transient failures per the retry policy
    pub async fn probe(&self, url: &str) -> Result<ProbeOutcome, ProbeError> {
        let mut retry = 0;
        loop {
            let transient = match self.attempt(url).await {
                Attempt::Done(outcome) => return Ok(outcome),
                Attempt::Failed(error) => return Err(error),
                Attempt::Retry(transient) => transient,
            };

            if retry >= self.policy.max_retries {
                return Err(transient.into_error(url, retry + 1));
            }

            let delay = self.policy.delay_for(retry);
            tracing::warn!(
                "{} for {}; retrying in {:?} ({} retries left)",
                transient,
                url,
                delay,
                self.policy.max_retries - retry
            );
            tokio::time::sleep(delay).await;
            retry += 1;
        }
    }

    async fn attempt(&self, url: &str) -> Attempt {
        let response = match self
            .client
            .get(url)
            .header(USER_AGENT, random_user_agent())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Attempt::Retry(Transient::Timeout),
            Err(e) => {
                return Attempt::Failed(ProbeError::Http {
                    url: url.to_string(),
                    source: e,
                })
            }
        };

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            tracing::trace!("HTTP 404 for {}", url);
            return Attempt::Done(ProbeOutcome::NotFound);
        }

        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE {
            return Attempt::Retry(Transient::Throttled(status));
        }

        if !status.is_success() {
            tracing::info!("HTTP {} for {}; treating as not found", status.as_u16(), url);
            return Attempt::Done(ProbeOutcome::NotFound);
        }

        match response.text().await {
            Ok(body) => Attempt::Done(ProbeOutcome::Page(body)),
            Err(e) if e.is_timeout() => Attempt::Retry(Transient::Timeout),
            Err(e) => Attempt::Failed(ProbeError::Http {
                url: url.to_string(),
                source: e,
            }),
        }
    }
}
