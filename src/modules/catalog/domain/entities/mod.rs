mod venue;

pub use venue::{attribute, AttributeProvenance, VenueImage, VenueRecord, VenueVideo};
