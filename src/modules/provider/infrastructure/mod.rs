pub mod adapters;
pub mod cache;
pub mod http_client;

pub use adapters::{
    CustomImageSearchAdapter, GooglePlacesAdapter, PageMetaAdapter, YoutubeAdapter,
};
pub use cache::{CachedPlaceSearch, PlaceCache};
pub use http_client::{FetchClient, ProviderSpec, RetryPolicy};
