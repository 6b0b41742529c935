mod coordinates;
mod ranges;
mod source_tier;
mod venue_setting;

pub use coordinates::Coordinates;
pub use ranges::{CapacityRange, PriceRange, PriceUnit};
pub use source_tier::SourceTier;
pub use venue_setting::VenueSetting;
