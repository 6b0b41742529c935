pub mod domain;
pub mod infrastructure;

// Re-exports for easy external access
pub use domain::{
    attribute, AttributeProvenance, CapacityRange, Coordinates, PriceRange, SourceTier,
    VenueFilter, VenueImage, VenueRecord, VenueRepository, VenueSetting, VenueVideo,
};
pub use infrastructure::VenueRepositoryImpl;
