pub mod processors;
pub mod runner;
pub mod summary;

pub use processors::{AuditProcessor, EnrichProcessor, VerifyProcessor, VerifyScope};
pub use runner::{BatchRunner, RecordProcessor};
pub use summary::{RecordOutcome, RunSummary, ERROR_KIND};
