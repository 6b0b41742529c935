pub mod google_places;
pub mod image_search;
pub mod page_meta;
pub mod youtube;

pub use google_places::GooglePlacesAdapter;
pub use image_search::CustomImageSearchAdapter;
pub use page_meta::PageMetaAdapter;
pub use youtube::YoutubeAdapter;
