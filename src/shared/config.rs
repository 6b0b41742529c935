use crate::shared::errors::{EngineError, EngineResult};
use std::env;

/// Runtime configuration loaded from the environment (`.env` supported).
///
/// Provider keys are optional at load time; each run validates the keys it
/// actually needs before touching any record, so a missing credential fails
/// fast instead of erroring halfway through a batch.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub database_url: String,
    pub places_api_key: Option<String>,
    pub search_api_key: Option<String>,
    pub search_engine_id: Option<String>,
    pub youtube_api_key: Option<String>,
}

impl EngineConfig {
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();

        let database_url = Self::validated_database_url()?;

        Ok(Self {
            database_url,
            places_api_key: env_opt("PLACES_API_KEY"),
            search_api_key: env_opt("SEARCH_API_KEY"),
            search_engine_id: env_opt("SEARCH_ENGINE_ID"),
            youtube_api_key: env_opt("YOUTUBE_API_KEY"),
        })
    }

    fn validated_database_url() -> EngineResult<String> {
        let database_url = env::var("DATABASE_URL").map_err(|_| {
            EngineError::Configuration("DATABASE_URL environment variable not found".to_string())
        })?;

        if !database_url.starts_with("postgres://") && !database_url.starts_with("postgresql://") {
            return Err(EngineError::Configuration(
                "Invalid database URL format. Must start with postgres:// or postgresql://"
                    .to_string(),
            ));
        }

        Ok(database_url)
    }

    pub fn require_places_key(&self) -> EngineResult<&str> {
        self.places_api_key
            .as_deref()
            .ok_or_else(|| missing("PLACES_API_KEY", "place search"))
    }

    pub fn require_search_credentials(&self) -> EngineResult<(&str, &str)> {
        let key = self
            .search_api_key
            .as_deref()
            .ok_or_else(|| missing("SEARCH_API_KEY", "image search"))?;
        let cx = self
            .search_engine_id
            .as_deref()
            .ok_or_else(|| missing("SEARCH_ENGINE_ID", "image search"))?;
        Ok((key, cx))
    }

    pub fn require_youtube_key(&self) -> EngineResult<&str> {
        self.youtube_api_key
            .as_deref()
            .ok_or_else(|| missing("YOUTUBE_API_KEY", "video search"))
    }
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn missing(var: &str, needed_for: &str) -> EngineError {
    EngineError::Configuration(format!("{} is not set (required for {})", var, needed_for))
}
