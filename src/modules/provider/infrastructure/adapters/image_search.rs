use async_trait::async_trait;
use serde::Deserialize;

use crate::log_debug;
use crate::modules::provider::domain::{ImageHit, ImageSearchProvider};
use crate::modules::provider::infrastructure::http_client::{FetchClient, ProviderSpec};
use crate::shared::errors::{EngineResult, ProviderError};

const BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// The custom-search API caps `num` at 10 per request.
const MAX_RESULTS_PER_CALL: usize = 10;

/// Image search via the Google Custom Search JSON API.
pub struct CustomImageSearchAdapter {
    http_client: FetchClient,
    base_url: String,
    api_key: String,
    engine_id: String,
}

impl CustomImageSearchAdapter {
    pub fn new(api_key: String, engine_id: String) -> EngineResult<Self> {
        Ok(Self {
            http_client: FetchClient::new(ProviderSpec::image_search())?,
            base_url: BASE_URL.to_string(),
            api_key,
            engine_id,
        })
    }

    fn build_url(&self, query: &str, limit: usize) -> String {
        format!(
            "{}?key={}&cx={}&searchType=image&num={}&q={}",
            self.base_url,
            self.api_key,
            self.engine_id,
            limit.clamp(1, MAX_RESULTS_PER_CALL),
            urlencoding::encode(query),
        )
    }
}

#[async_trait]
impl ImageSearchProvider for CustomImageSearchAdapter {
    async fn search_images(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ImageHit>, ProviderError> {
        let url = self.build_url(query, limit);

        log_debug!("image-search: querying '{}'", query);

        let response: SearchResponse = self.http_client.get_json(&url).await?;

        let hits: Vec<ImageHit> = response
            .items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| {
                let url = item.link?;
                let (width, height, context_url) = match item.image {
                    Some(meta) => (meta.width, meta.height, meta.context_link),
                    None => (None, None, None),
                };
                Some(ImageHit {
                    url,
                    width,
                    height,
                    context_url,
                })
            })
            .take(limit)
            .collect();

        log_debug!("image-search: {} hits for '{}'", hits.len(), query);
        Ok(hits)
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
}

#[derive(Deserialize)]
struct SearchItem {
    link: Option<String>,
    image: Option<ImageMeta>,
}

#[derive(Deserialize)]
struct ImageMeta {
    width: Option<u32>,
    height: Option<u32>,
    #[serde(rename = "contextLink")]
    context_link: Option<String>,
}
