use async_trait::async_trait;
use regex::Regex;
use reqwest::Url;

use crate::log_debug;
use crate::modules::provider::domain::{ImageHit, PageMetadataProvider};
use crate::modules::provider::infrastructure::http_client::{FetchClient, ProviderSpec};
use crate::shared::errors::{EngineError, EngineResult, ProviderError};

/// Pulls the og:image a page declares about itself.
///
/// Venue sites are built on every CMS imaginable, so extraction is a pair
/// of forgiving regexes over the raw HTML rather than a full parse.
pub struct PageMetaAdapter {
    http_client: FetchClient,
    property_first: Regex,
    content_first: Regex,
}

impl PageMetaAdapter {
    pub fn new() -> EngineResult<Self> {
        let property_first = Regex::new(
            r#"(?i)<meta[^>]*property\s*=\s*["']og:image["'][^>]*content\s*=\s*["']([^"']+)["']"#,
        )
        .map_err(|e| EngineError::Configuration(format!("og:image pattern: {}", e)))?;
        let content_first = Regex::new(
            r#"(?i)<meta[^>]*content\s*=\s*["']([^"']+)["'][^>]*property\s*=\s*["']og:image["']"#,
        )
        .map_err(|e| EngineError::Configuration(format!("og:image pattern: {}", e)))?;

        Ok(Self {
            http_client: FetchClient::new(ProviderSpec::pages())?,
            property_first,
            content_first,
        })
    }

    fn extract_og_image(&self, html: &str) -> Option<String> {
        self.property_first
            .captures(html)
            .or_else(|| self.content_first.captures(html))
            .and_then(|caps| caps.get(1))
            // Attribute values arrive entity-escaped.
            .map(|m| m.as_str().replace("&amp;", "&"))
    }

    /// Resolves a possibly-relative og:image value against its page.
    fn resolve(page_url: &str, content: &str) -> Option<String> {
        let base = Url::parse(page_url).ok()?;
        let resolved = base.join(content).ok()?;
        if resolved.scheme() == "http" || resolved.scheme() == "https" {
            Some(resolved.to_string())
        } else {
            None
        }
    }
}

#[async_trait]
impl PageMetadataProvider for PageMetaAdapter {
    async fn fetch_meta_image(&self, page_url: &str) -> Result<Option<ImageHit>, ProviderError> {
        let html = match self.http_client.get_text(page_url).await {
            Ok(html) => html,
            // A dead page declares nothing; only transport trouble is an error.
            Err(ProviderError::Status { code: 404 | 410, .. }) => {
                log_debug!("pages: {} is gone", page_url);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let Some(content) = self.extract_og_image(&html) else {
            log_debug!("pages: no og:image on {}", page_url);
            return Ok(None);
        };

        let Some(url) = Self::resolve(page_url, &content) else {
            log_debug!("pages: unresolvable og:image '{}' on {}", content, page_url);
            return Ok(None);
        };

        Ok(Some(ImageHit {
            url,
            width: None,
            height: None,
            context_url: Some(page_url.to_string()),
        }))
    }
}
