pub mod geo;
pub mod video;

pub use geo::{GeoFinding, GeoOptions, GeoVerifier};
pub use video::{VideoFinding, VideoOptions, VideoStatus, VideoVerifier};

/// Finding kinds. The first two double as review-flag kinds persisted in
/// fix mode; all of them key the grouped listing at the end of a run.
pub mod flags {
    pub const GEO_DIVERGENCE: &str = "geo_divergence";
    pub const VIDEO_UNVERIFIABLE: &str = "video_unverifiable";
    pub const GEO_DRIFT: &str = "geo_drift";
    pub const GEO_UNRESOLVED: &str = "geo_unresolved";
}
