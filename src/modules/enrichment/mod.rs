pub mod policy;
pub mod waterfall;

pub use policy::{AttributeClass, EnrichmentPolicy, ImageStep};
pub use waterfall::{EnrichOutcome, EnrichmentOptions, EnrichmentWaterfall};
