mod venue_repository_impl;

pub use venue_repository_impl::VenueRepositoryImpl;
