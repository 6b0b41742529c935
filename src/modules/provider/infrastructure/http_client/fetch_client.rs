use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use super::retry_policy::{is_retryable_transport_error, RateLimitInfo, RetryPolicy};
use crate::shared::errors::{EngineError, EngineResult, ProviderError};
use crate::shared::utils::logger::LogContext;
use crate::{log_debug, log_warn};

const USER_AGENT: &str = concat!("verity/", env!("CARGO_PKG_VERSION"));

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Wire profile for one provider: how fast it may be called, how long a
/// request may run, and how failures are retried.
#[derive(Debug, Clone)]
pub struct ProviderSpec {
    pub name: &'static str,
    /// Minimum spacing between consecutive requests.
    pub min_interval: Duration,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl ProviderSpec {
    pub fn places() -> Self {
        Self {
            name: "places",
            min_interval: Duration::from_millis(100),
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::standard(),
        }
    }

    /// Custom-search image quota is small and daily; lose as few requests
    /// as possible.
    pub fn image_search() -> Self {
        Self {
            name: "image-search",
            min_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::patient(),
        }
    }

    pub fn youtube() -> Self {
        Self {
            name: "youtube",
            min_interval: Duration::from_millis(200),
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::standard(),
        }
    }

    /// Arbitrary venue websites: be polite, give up quickly.
    pub fn pages() -> Self {
        Self {
            name: "pages",
            min_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(10),
            retry: RetryPolicy {
                max_retries: 1,
                base_delay: Duration::from_millis(500),
                max_delay: Duration::from_secs(5),
                jitter: Duration::from_millis(250),
            },
        }
    }
}

/// Rate-limited HTTP client for one upstream provider.
///
/// Every request waits on the pacing limiter first, so callers never have
/// to think about request spacing. Failures come back classified as
/// [`ProviderError`] outcomes after the retry budget is spent.
pub struct FetchClient {
    client: Client,
    rate_limiter: DirectRateLimiter,
    spec: ProviderSpec,
}

impl FetchClient {
    pub fn new(spec: ProviderSpec) -> EngineResult<Self> {
        Self::with_headers(spec, HeaderMap::new())
    }

    /// Build a client that sends `headers` on every request. Providers that
    /// authenticate via headers set them here once.
    pub fn with_headers(spec: ProviderSpec, headers: HeaderMap) -> EngineResult<Self> {
        let mut builder = Client::builder().timeout(spec.timeout).user_agent(USER_AGENT);
        if !headers.is_empty() {
            builder = builder.default_headers(headers);
        }
        let client = builder.build().map_err(|e| {
            EngineError::Configuration(format!("{}: HTTP client init failed: {}", spec.name, e))
        })?;

        let quota = Quota::with_period(spec.min_interval)
            .ok_or_else(|| {
                EngineError::Configuration(format!(
                    "{}: pacing interval must be non-zero",
                    spec.name
                ))
            })?
            .allow_burst(NonZeroU32::MIN);

        Ok(Self {
            client,
            rate_limiter: RateLimiter::direct(quota),
            spec,
        })
    }

    pub fn provider_name(&self) -> &str {
        self.spec.name
    }

    /// True when a request would go out immediately instead of waiting on
    /// the pacing limiter.
    pub fn can_make_request_now(&self) -> bool {
        self.rate_limiter.check().is_ok()
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ProviderError> {
        let response = self.request_with_retries(Method::GET, url, None).await?;
        self.parse_json(response).await
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &Value,
    ) -> Result<T, ProviderError> {
        let response = self
            .request_with_retries(Method::POST, url, Some(body))
            .await?;
        self.parse_json(response).await
    }

    /// Fetch a page body as text. Used for HTML, where callers do their own
    /// extraction.
    pub async fn get_text(&self, url: &str) -> Result<String, ProviderError> {
        let response = self.request_with_retries(Method::GET, url, None).await?;
        response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(self.spec.name, e))
    }

    async fn request_with_retries(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Response, ProviderError> {
        let mut attempt: u32 = 0;

        loop {
            self.rate_limiter.until_ready().await;

            let started = Instant::now();
            let mut request = self.client.request(method.clone(), url);
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.as_u16() == 429 {
                        let info = RateLimitInfo::from_headers(response.headers());
                        if attempt >= self.spec.retry.max_retries {
                            return Err(ProviderError::RateLimited {
                                provider: self.spec.name.to_string(),
                            });
                        }
                        let delay = self.spec.retry.calculate_delay(Some(info.recommended_delay()));
                        log_warn!(
                            "{}: rate limited (remaining: {:?}), retrying in {:?}",
                            self.spec.name,
                            info.remaining,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    if status.is_server_error() && attempt < self.spec.retry.max_retries {
                        let delay = self.spec.retry.calculate_delay(None);
                        log_warn!(
                            "{}: HTTP {} on {}, retrying in {:?}",
                            self.spec.name,
                            status.as_u16(),
                            url,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    if !status.is_success() {
                        return Err(ProviderError::Status {
                            provider: self.spec.name.to_string(),
                            code: status.as_u16(),
                        });
                    }

                    LogContext::provider_call(
                        self.spec.name,
                        url,
                        status.as_str(),
                        Some(started.elapsed().as_millis() as u64),
                    );
                    return Ok(response);
                }
                Err(err) => {
                    if is_retryable_transport_error(&err) && attempt < self.spec.retry.max_retries {
                        let delay = self.spec.retry.calculate_delay(None);
                        log_debug!(
                            "{}: transport error ({}), retrying in {:?}",
                            self.spec.name,
                            err,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(ProviderError::from_reqwest(self.spec.name, err));
                }
            }
        }
    }

    async fn parse_json<T: DeserializeOwned>(&self, response: Response) -> Result<T, ProviderError> {
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(self.spec.name, e))?;

        serde_json::from_str(&text).map_err(|e| ProviderError::Malformed {
            provider: self.spec.name.to_string(),
            detail: format!("{} (body: {})", e, truncate_body(&text)),
        })
    }
}

fn truncate_body(body: &str) -> &str {
    let end = body
        .char_indices()
        .take(200)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    &body[..end]
}
