// Shared Kernel - Domain Driven Design
// Following Clean Architecture + Hexagonal Architecture patterns

pub mod config; // Environment-backed runtime configuration
pub mod errors; // Shared error types
pub mod infrastructure; // Shared infrastructure (database, logging)
pub mod utils; // Shared utilities

// Re-exports for convenience
pub use config::EngineConfig;
pub use errors::{EngineError, EngineResult, ProviderError};
pub use infrastructure::database::Database;
