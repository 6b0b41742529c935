use std::sync::Arc;

use super::classification::ClassificationTable;
use super::rules::{self, AuditIssue};
use crate::log_info;
use crate::modules::catalog::domain::{VenueRecord, VenueRepository, VenueSetting};
use crate::shared::errors::EngineResult;

#[derive(Debug, Clone, Default)]
pub struct AuditOptions {
    pub dry_run: bool,
    pub fix_types: bool,
    pub fix_settings: bool,
}

/// What one audited record produced.
#[derive(Debug, Default)]
pub struct AuditOutcome {
    pub issues: Vec<AuditIssue>,
    pub completeness: i32,
    pub types_added: usize,
    pub settings_added: usize,
}

impl AuditOutcome {
    pub fn applied_fixes(&self) -> bool {
        self.types_added > 0 || self.settings_added > 0
    }
}

/// Runs the rule set over records and applies the two low-risk auto-fixes.
pub struct QualityAuditor {
    repository: Arc<dyn VenueRepository>,
    classification: ClassificationTable,
}

impl QualityAuditor {
    pub fn new(repository: Arc<dyn VenueRepository>, classification: ClassificationTable) -> Self {
        Self {
            repository,
            classification,
        }
    }

    /// Audit one record: evaluate every check, optionally infer missing
    /// classifications and settings, and persist the per-record score.
    ///
    /// Issues describe the record as it was loaded; a fix applied here shows
    /// up as a passing check on the next run, not this one.
    pub async fn audit_record(
        &self,
        record: &VenueRecord,
        options: &AuditOptions,
    ) -> EngineResult<AuditOutcome> {
        let issues = rules::run_checks(record);
        let completeness = rules::completeness_score(1, issues.len());

        let mut outcome = AuditOutcome {
            issues,
            completeness,
            ..AuditOutcome::default()
        };

        if options.fix_types && record.venue_types.is_empty() {
            outcome.types_added = self.fix_types(record, options.dry_run).await?;
        }

        if options.fix_settings && record.settings.is_empty() {
            outcome.settings_added = self.fix_settings(record, options.dry_run).await?;
        }

        if !options.dry_run {
            self.repository
                .record_audit(&record.id, completeness)
                .await?;
        }

        Ok(outcome)
    }

    /// Classification inference over name + description. A record may match
    /// several types; writing none (nothing inferable) is not an error.
    async fn fix_types(&self, record: &VenueRecord, dry_run: bool) -> EngineResult<usize> {
        let text = match record.description.as_deref() {
            Some(description) => format!("{} {}", record.name, description),
            None => record.name.clone(),
        };
        let inferred = self.classification.infer(&text);

        if inferred.is_empty() {
            return Ok(0);
        }
        if dry_run {
            log_info!(
                "[dry-run] {}: would add types {:?}",
                record.id,
                inferred
            );
            return Ok(0);
        }

        let added = self
            .repository
            .upsert_type_links(&record.id, &inferred)
            .await?;
        log_info!("{}: added {} inferred types {:?}", record.id, added, inferred);
        Ok(added)
    }

    /// Default-fill: a venue with no recorded setting is assumed usable both
    /// ways until someone says otherwise.
    async fn fix_settings(&self, record: &VenueRecord, dry_run: bool) -> EngineResult<usize> {
        let defaults = [VenueSetting::Indoor, VenueSetting::Outdoor];

        if dry_run {
            log_info!("[dry-run] {}: would add default settings", record.id);
            return Ok(0);
        }

        let added = self
            .repository
            .upsert_setting_links(&record.id, &defaults)
            .await?;
        log_info!("{}: added {} default settings", record.id, added);
        Ok(added)
    }
}
