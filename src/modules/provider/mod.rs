pub mod domain;
pub mod infrastructure;

pub use domain::{
    ImageHit, ImageSearchProvider, PageMetadataProvider, PlaceHit, PlaceSearchProvider, VideoHit,
    VideoMetadata, VideoSearchProvider,
};
pub use infrastructure::{
    CachedPlaceSearch, CustomImageSearchAdapter, GooglePlacesAdapter, PageMetaAdapter, PlaceCache,
    YoutubeAdapter,
};
