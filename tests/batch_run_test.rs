#![allow(dead_code)]

/// Batch runs wired end to end: paging, slicing, resume offsets, per-record
/// failure isolation, and the audit and enrich passes writing through the
/// repository.
mod utils;

use std::sync::Arc;

use async_trait::async_trait;
use utils::doubles::{
    InMemoryVenueRepository, ScriptedImages, ScriptedPages, ScriptedPlaces, ScriptedVideos,
};
use utils::factories::VenueFactory;
use verity_lib::modules::audit::{AuditOptions, ClassificationTable, QualityAuditor};
use verity_lib::modules::batch::{
    AuditProcessor, BatchRunner, EnrichProcessor, RecordOutcome, RecordProcessor,
};
use verity_lib::modules::catalog::domain::{VenueFilter, VenueRecord, VenueSetting};
use verity_lib::modules::enrichment::{EnrichmentOptions, EnrichmentPolicy, EnrichmentWaterfall};
use verity_lib::shared::errors::{EngineError, EngineResult};

fn audit_processor(
    repository: Arc<InMemoryVenueRepository>,
    options: AuditOptions,
) -> AuditProcessor {
    AuditProcessor::new(
        QualityAuditor::new(repository, ClassificationTable::standard().unwrap()),
        options,
    )
}

#[tokio::test]
async fn audit_pass_stamps_every_record_in_the_slice() {
    let repository = Arc::new(InMemoryVenueRepository::seeded(vec![
        VenueFactory::minimal().with_id("venue-a").build(),
        VenueFactory::minimal().with_id("venue-b").build(),
        VenueFactory::complete().with_id("venue-c").build(),
    ]));
    let processor = audit_processor(repository.clone(), AuditOptions::default());
    let runner = BatchRunner::new(repository.clone()).with_page_size(2);

    let summary = runner
        .run(&processor, &VenueFilter::default())
        .await
        .unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.errored, 0);
    assert_eq!(summary.next_offset, 3);
    for id in ["venue-a", "venue-b", "venue-c"] {
        let stored = repository.get(id);
        assert!(stored.completeness.is_some(), "{} not scored", id);
        assert!(stored.last_audited_at.is_some(), "{} not stamped", id);
    }
    // A bare record fails 9 of the 11 checks; a complete one fails none.
    assert_eq!(repository.get("venue-a").completeness, Some(18));
    assert_eq!(repository.get("venue-c").completeness, Some(100));
    // Missing coordinates are critical, so the bare records need attention,
    // grouped under the failing check's name.
    assert!(summary
        .attention
        .iter()
        .any(|(id, kind, _)| id == "venue-a" && kind == "coordinates"));
}

#[tokio::test]
async fn fix_mode_infers_types_and_defaults_settings() {
    let repository = Arc::new(InMemoryVenueRepository::seeded(vec![VenueFactory::minimal()
        .with_id("venue-a")
        .with_name("Silver Creek Barn")
        .with_description("A restored barn beside a working vineyard in the gorge.")
        .build()]));
    let processor = audit_processor(
        repository.clone(),
        AuditOptions {
            dry_run: false,
            fix_types: true,
            fix_settings: true,
        },
    );
    let runner = BatchRunner::new(repository.clone());

    let summary = runner
        .run(&processor, &VenueFilter::default())
        .await
        .unwrap();

    assert_eq!(summary.changed, 1);
    let stored = repository.get("venue-a");
    assert_eq!(stored.venue_types, vec!["barn", "winery"]);
    assert_eq!(
        stored.settings,
        vec![VenueSetting::Indoor, VenueSetting::Outdoor]
    );
}

#[tokio::test]
async fn region_slice_with_limit_then_resume_covers_everything_once() {
    let mut seeds = Vec::new();
    for i in 0..4 {
        seeds.push(
            VenueFactory::minimal()
                .with_id(&format!("napa-{}", i))
                .with_region("Napa")
                .build(),
        );
    }
    seeds.push(
        VenueFactory::minimal()
            .with_id("sonoma-0")
            .with_region("Sonoma")
            .build(),
    );
    let repository = Arc::new(InMemoryVenueRepository::seeded(seeds));
    let processor = audit_processor(repository.clone(), AuditOptions::default());
    let runner = BatchRunner::new(repository.clone());
    let napa = VenueFilter::default().with_region("Napa");

    let first = runner
        .run(&processor, &napa.clone().with_limit(2))
        .await
        .unwrap();
    assert_eq!(first.processed, 2);
    assert_eq!(first.next_offset, 2);

    // Picking up at the reported offset finishes the slice.
    let second = runner
        .run(&processor, &napa.clone().with_offset(first.next_offset))
        .await
        .unwrap();
    assert_eq!(second.processed, 2);
    assert_eq!(second.next_offset, 4);

    for i in 0..4 {
        assert!(repository.get(&format!("napa-{}", i)).last_audited_at.is_some());
    }
    // The other region's record was never part of the slice.
    assert!(repository.get("sonoma-0").last_audited_at.is_none());
}

struct FlakyProcessor {
    bad_id: &'static str,
}

#[async_trait]
impl RecordProcessor for FlakyProcessor {
    fn label(&self) -> &'static str {
        "audit"
    }

    async fn process(&self, record: &VenueRecord) -> EngineResult<RecordOutcome> {
        if record.id == self.bad_id {
            Err(EngineError::Validation("boom".to_string()))
        } else {
            Ok(RecordOutcome::wrote())
        }
    }
}

#[tokio::test]
async fn record_failures_are_isolated_and_reported() {
    let repository = Arc::new(InMemoryVenueRepository::seeded(vec![
        VenueFactory::minimal().with_id("venue-a").build(),
        VenueFactory::minimal().with_id("venue-b").build(),
        VenueFactory::minimal().with_id("venue-c").build(),
    ]));
    let runner = BatchRunner::new(repository.clone());

    let summary = runner
        .run(
            &FlakyProcessor { bad_id: "venue-b" },
            &VenueFilter::default(),
        )
        .await
        .unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.changed, 2);
    assert_eq!(summary.errored, 1);
    assert!(!summary.interrupted);
    assert!(summary
        .attention
        .iter()
        .any(|(id, kind, note)| id == "venue-b" && kind == "error" && note.contains("boom")));
    // The rendered summary still tells the operator where to pick up.
    assert!(summary.to_string().contains("--start 3"));
}

#[tokio::test]
async fn enrich_pass_writes_through_the_runner() {
    let repository = Arc::new(InMemoryVenueRepository::seeded(vec![
        VenueFactory::minimal()
            .with_id("venue-a")
            .with_name("Hillcrest Vineyard")
            .with_region("Napa")
            .build(),
        VenueFactory::minimal()
            .with_id("venue-b")
            .with_name("Seacliff Pavilion")
            .with_region("Central Coast")
            .build(),
    ]));
    // Every provider comes up empty, so each bare record bottoms out at
    // its regional placeholder.
    let waterfall = EnrichmentWaterfall::new(
        repository.clone(),
        Arc::new(ScriptedPlaces::empty()),
        Arc::new(ScriptedImages::empty()),
        Arc::new(ScriptedVideos::empty()),
        Arc::new(ScriptedPages::empty()),
        EnrichmentPolicy::standard(),
    )
    .unwrap();
    let processor = EnrichProcessor::new(waterfall, EnrichmentOptions::default());
    let runner = BatchRunner::new(repository.clone());

    let summary = runner
        .run(&processor, &VenueFilter::default())
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.changed, 2);
    assert_eq!(repository.get("venue-a").images.len(), 1);
    assert_eq!(repository.get("venue-b").images.len(), 1);
    // Regional placeholders differ between wine country and the coast.
    assert_ne!(
        repository.get("venue-a").images[0].url,
        repository.get("venue-b").images[0].url
    );
}
