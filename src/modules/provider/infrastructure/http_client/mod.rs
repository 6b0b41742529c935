pub mod fetch_client;
pub mod retry_policy;

pub use fetch_client::{FetchClient, ProviderSpec};
pub use retry_policy::{RateLimitInfo, RetryPolicy};
