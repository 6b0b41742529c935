pub mod models;
pub mod providers;

pub use models::{ImageHit, PlaceHit, VideoHit, VideoMetadata, YOUTUBE_ID_PATTERN};
pub use providers::{
    ImageSearchProvider, PageMetadataProvider, PlaceSearchProvider, VideoSearchProvider,
};

#[cfg(test)]
pub use providers::{
    MockImageSearchProvider, MockPageMetadataProvider, MockPlaceSearchProvider,
    MockVideoSearchProvider,
};
