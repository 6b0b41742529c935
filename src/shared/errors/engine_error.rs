use thiserror::Error;

/// Errors surfaced by provider calls over the wire.
///
/// Every variant carries the provider name so per-record reports can say
/// which upstream failed without digging through log output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("{provider}: request timed out")]
    Timeout { provider: String },

    #[error("{provider}: HTTP {code}")]
    Status { provider: String, code: u16 },

    #[error("{provider}: malformed response: {detail}")]
    Malformed { provider: String, detail: String },

    #[error("{provider}: network error: {detail}")]
    Network { provider: String, detail: String },

    #[error("{provider}: rate limited upstream")]
    RateLimited { provider: String },
}

impl ProviderError {
    /// Classify a reqwest failure into a wire outcome.
    pub fn from_reqwest(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout {
                provider: provider.to_string(),
            }
        } else if let Some(status) = err.status() {
            if status.as_u16() == 429 {
                ProviderError::RateLimited {
                    provider: provider.to_string(),
                }
            } else {
                ProviderError::Status {
                    provider: provider.to_string(),
                    code: status.as_u16(),
                }
            }
        } else if err.is_decode() {
            ProviderError::Malformed {
                provider: provider.to_string(),
                detail: err.to_string(),
            }
        } else {
            ProviderError::Network {
                provider: provider.to_string(),
                detail: err.to_string(),
            }
        }
    }

    pub fn provider(&self) -> &str {
        match self {
            ProviderError::Timeout { provider }
            | ProviderError::Status { provider, .. }
            | ProviderError::Malformed { provider, .. }
            | ProviderError::Network { provider, .. }
            | ProviderError::RateLimited { provider } => provider,
        }
    }

    /// Whether a retry with the same request can plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Timeout { .. }
            | ProviderError::Network { .. }
            | ProviderError::RateLimited { .. } => true,
            ProviderError::Status { code, .. } => matches!(code, 500 | 502 | 503 | 504),
            ProviderError::Malformed { .. } => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    /// Missing or invalid configuration. Fatal: abort before touching records.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(String),

    /// A provider call failed. Never fatal to a run; the record that
    /// triggered it is reported and the batch moves on.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<diesel::result::Error> for EngineError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => {
                EngineError::NotFound("Record not found in database".to_string())
            }
            _ => EngineError::Database(err.to_string()),
        }
    }
}

impl From<diesel::r2d2::PoolError> for EngineError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        EngineError::Database(format!("Database pool error: {}", err))
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Validation(format!("Invalid JSON: {}", err))
    }
}

impl From<std::num::ParseIntError> for EngineError {
    fn from(err: std::num::ParseIntError) -> Self {
        EngineError::Validation(format!("Invalid number: {}", err))
    }
}

impl From<std::num::ParseFloatError> for EngineError {
    fn from(err: std::num::ParseFloatError) -> Self {
        EngineError::Validation(format!("Invalid decimal number: {}", err))
    }
}

// Result type alias for convenience
pub type EngineResult<T> = Result<T, EngineError>;
