use super::models::{ImageHit, PlaceHit, VideoHit, VideoMetadata};
use crate::shared::errors::ProviderError;
use async_trait::async_trait;

/// Looks a venue up in an authoritative place index.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaceSearchProvider: Send + Sync {
    /// Returns the best match for the query, or None when the index has no
    /// plausible candidate.
    async fn search_place(&self, query: &str) -> Result<Option<PlaceHit>, ProviderError>;
}

/// General-purpose image search.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageSearchProvider: Send + Sync {
    async fn search_images(&self, query: &str, limit: usize)
        -> Result<Vec<ImageHit>, ProviderError>;
}

/// Video search plus per-video metadata lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoSearchProvider: Send + Sync {
    async fn search_videos(&self, query: &str, limit: usize)
        -> Result<Vec<VideoHit>, ProviderError>;

    /// None when the video no longer exists or is private.
    async fn fetch_video_metadata(&self, video_id: &str)
        -> Result<Option<VideoMetadata>, ProviderError>;
}

/// Extracts the representative image a page declares about itself.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageMetadataProvider: Send + Sync {
    /// Fetches the page and returns its og:image, if it declares one.
    async fn fetch_meta_image(&self, page_url: &str) -> Result<Option<ImageHit>, ProviderError>;
}
