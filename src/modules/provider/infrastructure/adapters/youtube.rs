use async_trait::async_trait;
use serde::Deserialize;

use crate::log_debug;
use crate::modules::provider::domain::{VideoHit, VideoMetadata, VideoSearchProvider};
use crate::modules::provider::infrastructure::http_client::{FetchClient, ProviderSpec};
use crate::shared::errors::{EngineResult, ProviderError};

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Video search and metadata lookup via the YouTube Data API.
pub struct YoutubeAdapter {
    http_client: FetchClient,
    base_url: String,
    api_key: String,
}

impl YoutubeAdapter {
    pub fn new(api_key: String) -> EngineResult<Self> {
        Ok(Self {
            http_client: FetchClient::new(ProviderSpec::youtube())?,
            base_url: BASE_URL.to_string(),
            api_key,
        })
    }

    pub fn watch_url(video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={}", video_id)
    }
}

#[async_trait]
impl VideoSearchProvider for YoutubeAdapter {
    async fn search_videos(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<VideoHit>, ProviderError> {
        let url = format!(
            "{}/search?key={}&part=snippet&type=video&maxResults={}&q={}",
            self.base_url,
            self.api_key,
            limit.clamp(1, 50),
            urlencoding::encode(query),
        );

        log_debug!("youtube: searching '{}'", query);

        let response: SearchResponse = self.http_client.get_json(&url).await?;

        let hits: Vec<VideoHit> = response
            .items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id?.video_id?;
                let title = item.snippet.map(|s| s.title).unwrap_or_default();
                let url = Self::watch_url(&video_id);
                Some(VideoHit {
                    video_id,
                    title,
                    url,
                })
            })
            .take(limit)
            .collect();

        log_debug!("youtube: {} hits for '{}'", hits.len(), query);
        Ok(hits)
    }

    async fn fetch_video_metadata(
        &self,
        video_id: &str,
    ) -> Result<Option<VideoMetadata>, ProviderError> {
        let url = format!(
            "{}/videos?key={}&part=snippet&id={}",
            self.base_url,
            self.api_key,
            urlencoding::encode(video_id),
        );

        let response: VideosResponse = self.http_client.get_json(&url).await?;

        // An empty item list means the video is gone or private.
        let metadata = response
            .items
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|item| item.snippet)
            .map(|snippet| VideoMetadata {
                title: snippet.title,
            });

        if metadata.is_none() {
            log_debug!("youtube: video '{}' is unavailable", video_id);
        }
        Ok(metadata)
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: Option<SearchItemId>,
    snippet: Option<Snippet>,
}

#[derive(Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct VideosResponse {
    items: Option<Vec<VideoItem>>,
}

#[derive(Deserialize)]
struct VideoItem {
    snippet: Option<Snippet>,
}

#[derive(Deserialize)]
struct Snippet {
    title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_url_embeds_video_id() {
        assert_eq!(
            YoutubeAdapter::watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn search_items_without_video_ids_are_dropped() {
        let body = r#"{"items":[
            {"id":{"kind":"youtube#channel"},"snippet":{"title":"A channel"}},
            {"id":{"videoId":"abc123"},"snippet":{"title":"Venue tour"}}
        ]}"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        let ids: Vec<_> = parsed
            .items
            .unwrap()
            .into_iter()
            .filter_map(|i| i.id.and_then(|id| id.video_id))
            .collect();
        assert_eq!(ids, vec!["abc123"]);
    }

    #[test]
    fn missing_items_parse_as_unavailable() {
        let parsed: VideosResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_none());
    }
}
