use rand::Rng;
use std::time::Duration;

/// Retry behavior for one provider.
///
/// Delays are fixed per attempt with a small random jitter, not exponential:
/// the providers here throttle by request spacing, and the engine runs
/// records one at a time, so backing off harder only slows the batch down.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Upper bound of the random jitter added to each delay.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// For providers that hand out generous quotas.
    pub fn standard() -> Self {
        Self::default()
    }

    /// For providers with strict daily quotas, where a lost request hurts.
    pub fn patient() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            jitter: Duration::from_millis(500),
        }
    }

    /// Delay before the next attempt. A server-provided Retry-After wins
    /// over the fixed delay, capped at `max_delay`.
    pub fn calculate_delay(&self, retry_after: Option<Duration>) -> Duration {
        if let Some(server_delay) = retry_after {
            return server_delay.min(self.max_delay);
        }

        let jitter_ms = self.jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
        };

        (self.base_delay + jitter).min(self.max_delay)
    }
}

/// Rate-limit state reported by a provider alongside a 429.
#[derive(Debug, Clone, Default)]
pub struct RateLimitInfo {
    pub retry_after: Option<Duration>,
    pub remaining: Option<u32>,
    pub limit: Option<u32>,
}

impl RateLimitInfo {
    pub fn from_headers(headers: &reqwest::header::HeaderMap) -> Self {
        let retry_after = headers
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        let remaining = headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u32>().ok());

        let limit = headers
            .get("x-ratelimit-limit")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u32>().ok());

        Self {
            retry_after,
            remaining,
            limit,
        }
    }

    /// Delay the provider asked for, with a fallback when it sent none.
    pub fn recommended_delay(&self) -> Duration {
        self.retry_after.unwrap_or(Duration::from_secs(5))
    }
}

/// Transport-level errors worth retrying before they are classified.
pub fn is_retryable_transport_error(error: &reqwest::Error) -> bool {
    if error.is_timeout() || error.is_connect() {
        return true;
    }
    if let Some(status) = error.status() {
        return matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504);
    }
    false
}
