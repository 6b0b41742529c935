pub mod entities;
pub mod repositories;
pub mod value_objects;

pub use entities::{attribute, AttributeProvenance, VenueImage, VenueRecord, VenueVideo};
pub use repositories::{VenueFilter, VenueRepository};
pub use value_objects::{CapacityRange, Coordinates, PriceRange, PriceUnit, SourceTier, VenueSetting};
