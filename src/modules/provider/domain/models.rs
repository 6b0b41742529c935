use crate::modules::catalog::domain::Coordinates;
use serde::{Deserialize, Serialize};

/// A place-search result for a venue lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceHit {
    pub place_id: String,
    pub name: String,
    pub coordinates: Coordinates,
    pub website: Option<String>,
    pub rating: Option<f32>,
}

/// One image candidate from a search provider or page scrape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageHit {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Page the image was found on, when the provider reports it.
    pub context_url: Option<String>,
}

impl ImageHit {
    pub fn bare(url: &str) -> Self {
        Self {
            url: url.to_string(),
            width: None,
            height: None,
            context_url: None,
        }
    }

    /// True when both dimensions are known and each reaches `floor` pixels.
    pub fn meets_size_floor(&self, floor: u32) -> bool {
        matches!((self.width, self.height), (Some(w), Some(h)) if w >= floor && h >= floor)
    }
}

/// Capture group 1 is the video id in any of the common YouTube URL shapes
/// (watch, embed, shorts, short link).
pub const YOUTUBE_ID_PATTERN: &str =
    r"(?:youtube\.com/(?:watch\?v=|embed/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{6,})";

/// One video candidate from a video search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoHit {
    pub video_id: String,
    pub title: String,
    pub url: String,
}

/// Metadata for a single known video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
}
