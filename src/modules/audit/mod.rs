pub mod auditor;
pub mod classification;
pub mod rules;

pub use auditor::{AuditOptions, AuditOutcome, QualityAuditor};
pub use classification::ClassificationTable;
pub use rules::{completeness_score, run_checks, AuditIssue, Severity, CHECK_COUNT};
