use async_trait::async_trait;

use super::runner::RecordProcessor;
use super::summary::RecordOutcome;
use crate::modules::audit::{AuditOptions, QualityAuditor, Severity};
use crate::modules::catalog::domain::VenueRecord;
use crate::modules::enrichment::{EnrichmentOptions, EnrichmentWaterfall};
use crate::modules::verification::{flags, GeoFinding, GeoOptions, GeoVerifier};
use crate::modules::verification::{VideoOptions, VideoVerifier};
use crate::shared::errors::EngineResult;
use crate::{log_info, log_warn};

/// Audit pass: rule checks, completeness stamping, opt-in auto-fixes.
/// Issues are logged as they are found; critical ones also land in the
/// summary's attention list.
pub struct AuditProcessor {
    auditor: QualityAuditor,
    options: AuditOptions,
}

impl AuditProcessor {
    pub fn new(auditor: QualityAuditor, options: AuditOptions) -> Self {
        Self { auditor, options }
    }
}

#[async_trait]
impl RecordProcessor for AuditProcessor {
    fn label(&self) -> &'static str {
        "audit"
    }

    async fn process(&self, record: &VenueRecord) -> EngineResult<RecordOutcome> {
        let audit = self.auditor.audit_record(record, &self.options).await?;

        let mut outcome = RecordOutcome {
            changed: audit.applied_fixes(),
            planned: if self.options.dry_run {
                audit.types_added + audit.settings_added
            } else {
                0
            },
            ..RecordOutcome::default()
        };

        for issue in &audit.issues {
            match issue.severity {
                Severity::Critical | Severity::High => {
                    log_warn!("{}: [{}] {}", record.id, issue.field, issue.message)
                }
                _ => log_info!("{}: [{}] {}", record.id, issue.field, issue.message),
            }
            if issue.severity == Severity::Critical {
                outcome
                    .notes
                    .push((issue.field.to_string(), issue.message.clone()));
            }
        }
        log_info!(
            "{}: completeness {} ({} issues)",
            record.id,
            audit.completeness,
            audit.issues.len()
        );

        Ok(outcome)
    }
}

/// Enrichment pass: the provider waterfall per attribute class.
pub struct EnrichProcessor {
    waterfall: EnrichmentWaterfall,
    options: EnrichmentOptions,
}

impl EnrichProcessor {
    pub fn new(waterfall: EnrichmentWaterfall, options: EnrichmentOptions) -> Self {
        Self { waterfall, options }
    }
}

#[async_trait]
impl RecordProcessor for EnrichProcessor {
    fn label(&self) -> &'static str {
        "enrich"
    }

    async fn process(&self, record: &VenueRecord) -> EngineResult<RecordOutcome> {
        let enriched = self.waterfall.enrich_record(record, &self.options).await?;
        Ok(RecordOutcome {
            changed: enriched.wrote_anything(),
            planned: enriched.planned,
            provider_failures: enriched.provider_failures,
            ..RecordOutcome::default()
        })
    }
}

/// Which verification paths a verify run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum VerifyScope {
    Geo,
    Video,
    #[default]
    All,
}

impl VerifyScope {
    pub fn includes_geo(self) -> bool {
        matches!(self, VerifyScope::Geo | VerifyScope::All)
    }

    pub fn includes_video(self) -> bool {
        matches!(self, VerifyScope::Video | VerifyScope::All)
    }
}

/// Verification pass: geo divergence and video liveness/relevance.
pub struct VerifyProcessor {
    geo: GeoVerifier,
    video: VideoVerifier,
    scope: VerifyScope,
    geo_options: GeoOptions,
    video_options: VideoOptions,
}

impl VerifyProcessor {
    pub fn new(
        geo: GeoVerifier,
        video: VideoVerifier,
        scope: VerifyScope,
        geo_options: GeoOptions,
        video_options: VideoOptions,
    ) -> Self {
        Self {
            geo,
            video,
            scope,
            geo_options,
            video_options,
        }
    }
}

#[async_trait]
impl RecordProcessor for VerifyProcessor {
    fn label(&self) -> &'static str {
        "verify"
    }

    async fn process(&self, record: &VenueRecord) -> EngineResult<RecordOutcome> {
        let mut outcome = RecordOutcome::default();

        if self.scope.includes_geo() {
            match self.geo.verify_record(record, &self.geo_options).await? {
                GeoFinding::Confirmed { .. } | GeoFinding::NoCoordinates => {}
                GeoFinding::Corrected {
                    applied: true,
                    distance_m,
                    ..
                } => {
                    outcome.changed = true;
                    log_info!("{}: coordinates corrected ({:.0} m)", record.id, distance_m);
                }
                GeoFinding::Corrected {
                    applied: false,
                    distance_m,
                    to,
                } => {
                    outcome.notes.push((
                        flags::GEO_DRIFT.to_string(),
                        format!("coordinates {:.0} m off; candidate {}", distance_m, to),
                    ));
                }
                GeoFinding::OutOfRange {
                    distance_m,
                    name_affinity,
                    flagged,
                } => {
                    outcome.flagged |= flagged;
                    outcome.notes.push((
                        flags::GEO_DIVERGENCE.to_string(),
                        format!(
                            "place match {:.1} km away (name affinity {:.2})",
                            distance_m / 1000.0,
                            name_affinity
                        ),
                    ));
                }
                GeoFinding::Unresolved => {
                    outcome.notes.push((
                        flags::GEO_UNRESOLVED.to_string(),
                        "place index had no match".to_string(),
                    ));
                }
            }
        }

        if self.scope.includes_video() {
            for finding in self
                .video
                .verify_record(record, &self.video_options)
                .await?
            {
                if finding.is_valid() {
                    continue;
                }
                if finding.replacement.is_some() {
                    outcome.changed = true;
                    continue;
                }
                outcome.flagged |= finding.flagged;
                outcome.notes.push((
                    flags::VIDEO_UNVERIFIABLE.to_string(),
                    format!("video {} is {}", finding.url, finding.status.label()),
                ));
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::audit::ClassificationTable;
    use crate::modules::catalog::domain::repositories::MockVenueRepository;
    use crate::modules::catalog::domain::{CapacityRange, Coordinates, PriceRange};
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn record() -> VenueRecord {
        VenueRecord {
            id: "venue-1".to_string(),
            name: "Willow Creek Ranch".to_string(),
            region: Some("Sonoma".to_string()),
            country: Some("United States".to_string()),
            subregion: None,
            address: None,
            description: None,
            website: None,
            phone: None,
            coordinates: Some(Coordinates::new(38.3, -122.5)),
            capacity: CapacityRange::default(),
            price: PriceRange::default(),
            rating: None,
            review_count: None,
            completeness: None,
            venue_types: Vec::new(),
            settings: Vec::new(),
            images: Vec::new(),
            videos: Vec::new(),
            provenance: HashMap::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_audited_at: None,
        }
    }

    #[tokio::test]
    async fn audit_processor_surfaces_critical_issues_as_notes() {
        let mut repository = MockVenueRepository::new();
        repository.expect_record_audit().returning(|_, _| Ok(()));

        let mut bare = record();
        bare.coordinates = None;

        let processor = AuditProcessor::new(
            QualityAuditor::new(
                Arc::new(repository),
                ClassificationTable::standard().unwrap(),
            ),
            AuditOptions::default(),
        );

        let outcome = processor.process(&bare).await.unwrap();
        assert!(!outcome.changed);
        assert!(outcome.notes.iter().any(|(kind, _)| kind == "coordinates"));
    }

    #[test]
    fn scope_selects_paths() {
        assert!(VerifyScope::All.includes_geo());
        assert!(VerifyScope::All.includes_video());
        assert!(VerifyScope::Geo.includes_geo());
        assert!(!VerifyScope::Geo.includes_video());
        assert!(!VerifyScope::Video.includes_geo());
    }
}
