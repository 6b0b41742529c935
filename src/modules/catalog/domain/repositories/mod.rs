mod venue_repository;

pub use venue_repository::{VenueFilter, VenueRepository};

#[cfg(test)]
pub use venue_repository::MockVenueRepository;
