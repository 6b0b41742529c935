#![allow(dead_code)]

/// Geo and video verification against the in-memory store: threshold and
/// correction-cap behavior, review flags, and replacement swaps.
mod utils;

use std::sync::Arc;

use utils::doubles::{InMemoryVenueRepository, ScriptedPlaces, ScriptedVideos};
use utils::factories::VenueFactory;
use verity_lib::modules::catalog::domain::{attribute, Coordinates, PriceUnit, SourceTier};
use verity_lib::modules::enrichment::EnrichmentPolicy;
use verity_lib::modules::verification::{
    flags, GeoFinding, GeoOptions, GeoVerifier, VideoOptions, VideoStatus, VideoVerifier,
};
use verity_lib::modules::provider::domain::{PlaceHit, VideoHit};

fn sonoma_record() -> VenueFactory {
    VenueFactory::minimal()
        .with_id("venue-1")
        .with_name("Willow Creek Ranch")
        .with_region("Sonoma")
        .with_country("United States")
        .with_coordinates(38.3, -122.5)
}

fn place_at(latitude: f64, longitude: f64) -> PlaceHit {
    PlaceHit {
        place_id: "place-1".to_string(),
        name: "Willow Creek Ranch".to_string(),
        coordinates: Coordinates::new(latitude, longitude),
        website: None,
        rating: None,
    }
}

fn geo_rig(
    repository: InMemoryVenueRepository,
    places: ScriptedPlaces,
) -> (Arc<InMemoryVenueRepository>, GeoVerifier) {
    let repository = Arc::new(repository);
    let verifier = GeoVerifier::new(
        repository.clone(),
        Arc::new(places),
        EnrichmentPolicy::standard(),
    );
    (repository, verifier)
}

fn video_rig(
    repository: InMemoryVenueRepository,
    videos: ScriptedVideos,
) -> (Arc<InMemoryVenueRepository>, VideoVerifier) {
    let repository = Arc::new(repository);
    let verifier = VideoVerifier::new(
        repository.clone(),
        Arc::new(videos),
        EnrichmentPolicy::standard(),
    )
    .unwrap();
    (repository, verifier)
}

#[tokio::test]
async fn agreeing_place_match_confirms_without_writing() {
    let record = sonoma_record().build();
    // 0.0036 deg of latitude is roughly 400 m: inside the 500 m threshold.
    let (repository, verifier) = geo_rig(
        InMemoryVenueRepository::seeded(vec![record.clone()]),
        ScriptedPlaces::with_hit(place_at(38.3036, -122.5)),
    );

    let finding = verifier
        .verify_record(&record, &GeoOptions { fix: true, ..GeoOptions::default() })
        .await
        .unwrap();

    assert!(matches!(finding, GeoFinding::Confirmed { .. }));
    let stored = repository.get("venue-1");
    assert_eq!(stored.coordinates, Some(Coordinates::new(38.3, -122.5)));
    assert!(repository.review_flags().is_empty());
}

#[tokio::test]
async fn drift_inside_the_cap_is_corrected_in_fix_mode() {
    let record = sonoma_record()
        .with_address("4550 Willow Creek Rd, Healdsburg, CA")
        .with_price(6000, 14000)
        .with_price_unit(PriceUnit::PerEvent)
        .with_review_count(48)
        .build();
    // 0.36 deg of latitude is roughly 40 km: past the threshold, inside
    // the 50 km correction cap.
    let (repository, verifier) = geo_rig(
        InMemoryVenueRepository::seeded(vec![record.clone()]),
        ScriptedPlaces::with_hit(place_at(38.66, -122.5)),
    );

    let finding = verifier
        .verify_record(&record, &GeoOptions { fix: true, ..GeoOptions::default() })
        .await
        .unwrap();

    match finding {
        GeoFinding::Corrected { applied, .. } => assert!(applied),
        other => panic!("expected Corrected, got {:?}", other),
    }
    let stored = repository.get("venue-1");
    assert_eq!(stored.coordinates, Some(Coordinates::new(38.66, -122.5)));
    let prov = stored
        .provenance
        .get(attribute::COORDINATES)
        .expect("corrected coordinates carry provenance");
    assert_eq!(prov.source_tier, SourceTier::Authoritative);
    // The corrective write touches coordinates only.
    assert_eq!(
        stored.address.as_deref(),
        Some("4550 Willow Creek Rd, Healdsburg, CA")
    );
    assert_eq!(stored.price.unit, Some(PriceUnit::PerEvent));
    assert_eq!(stored.review_count, Some(48));
}

#[tokio::test]
async fn far_matches_are_flagged_for_review_instead_of_corrected() {
    let record = sonoma_record().build();
    // 1.8 deg of latitude is roughly 200 km: beyond the correction cap.
    let (repository, verifier) = geo_rig(
        InMemoryVenueRepository::seeded(vec![record.clone()]),
        ScriptedPlaces::with_hit(place_at(40.1, -122.5)),
    );

    let finding = verifier
        .verify_record(&record, &GeoOptions { fix: true, ..GeoOptions::default() })
        .await
        .unwrap();

    match finding {
        GeoFinding::OutOfRange { flagged, name_affinity, .. } => {
            assert!(flagged);
            assert!(name_affinity > 0.99);
        }
        other => panic!("expected OutOfRange, got {:?}", other),
    }
    // Coordinates stay put; the divergence lands in the review queue.
    let stored = repository.get("venue-1");
    assert_eq!(stored.coordinates, Some(Coordinates::new(38.3, -122.5)));
    let review = repository.review_flags();
    assert_eq!(review.len(), 1);
    assert_eq!(review[0].0, "venue-1");
    assert_eq!(review[0].1, flags::GEO_DIVERGENCE);
    assert!(review[0].2.contains("km"));
}

#[tokio::test]
async fn repeated_flagging_refreshes_the_existing_flag() {
    let record = sonoma_record().build();
    let (repository, verifier) = geo_rig(
        InMemoryVenueRepository::seeded(vec![record.clone()]),
        ScriptedPlaces::with_hit(place_at(40.1, -122.5)),
    );
    let options = GeoOptions { fix: true, ..GeoOptions::default() };

    verifier.verify_record(&record, &options).await.unwrap();
    verifier.verify_record(&record, &options).await.unwrap();

    assert_eq!(repository.review_flags().len(), 1);
}

#[tokio::test]
async fn gone_video_is_swapped_for_a_live_relevant_one() {
    let record = sonoma_record()
        .with_video(
            "https://www.youtube.com/watch?v=dead123xyz",
            "Willow Creek Ranch wedding film",
        )
        .build();
    let (repository, verifier) = video_rig(
        InMemoryVenueRepository::seeded(vec![record.clone()]),
        // The stored id is unknown to the provider, so it reads as deleted;
        // the search surfaces a live replacement.
        ScriptedVideos::empty()
            .with_search_hits(vec![VideoHit {
                video_id: "new456abc".to_string(),
                title: "Willow Creek Ranch wedding highlights".to_string(),
                url: "https://www.youtube.com/watch?v=new456abc".to_string(),
            }])
            .knowing("new456abc", "Willow Creek Ranch wedding highlights"),
    );

    let findings = verifier
        .verify_record(&record, &VideoOptions { fix: true })
        .await
        .unwrap();

    assert_eq!(findings[0].status, VideoStatus::Gone);
    assert_eq!(
        findings[0].replacement.as_deref(),
        Some("https://www.youtube.com/watch?v=new456abc")
    );
    let stored = repository.get("venue-1");
    assert_eq!(stored.videos.len(), 1);
    assert_eq!(
        stored.videos[0].url,
        "https://www.youtube.com/watch?v=new456abc"
    );
    // The replacement inherits the failed video's slot.
    assert_eq!(stored.videos[0].position, 0);
    assert!(repository.review_flags().is_empty());
}

#[tokio::test]
async fn unreplaceable_video_lands_in_the_review_queue() {
    let record = sonoma_record()
        .with_video(
            "https://www.youtube.com/watch?v=dead123xyz",
            "Willow Creek Ranch wedding film",
        )
        .build();
    let (repository, verifier) = video_rig(
        InMemoryVenueRepository::seeded(vec![record.clone()]),
        ScriptedVideos::empty(),
    );

    let findings = verifier
        .verify_record(&record, &VideoOptions { fix: true })
        .await
        .unwrap();

    assert_eq!(findings[0].status, VideoStatus::Gone);
    assert!(findings[0].flagged);
    // The dead link stays until a human decides; only the flag is written.
    let stored = repository.get("venue-1");
    assert_eq!(stored.videos.len(), 1);
    let review = repository.review_flags();
    assert_eq!(review.len(), 1);
    assert_eq!(review[0].1, flags::VIDEO_UNVERIFIABLE);
}

#[tokio::test]
async fn drifted_title_is_reported_without_writes_outside_fix_mode() {
    let record = sonoma_record()
        .with_video(
            "https://www.youtube.com/watch?v=live789abc",
            "Willow Creek Ranch wedding film",
        )
        .build();
    let (repository, verifier) = video_rig(
        InMemoryVenueRepository::seeded(vec![record.clone()]),
        ScriptedVideos::empty().knowing("live789abc", "Top 10 Tuscany villas"),
    );

    let findings = verifier
        .verify_record(&record, &VideoOptions::default())
        .await
        .unwrap();

    assert_eq!(
        findings[0].status,
        VideoStatus::Irrelevant {
            title: "Top 10 Tuscany villas".to_string()
        }
    );
    assert!(findings[0].replacement.is_none());
    assert_eq!(repository.get("venue-1").videos.len(), 1);
    assert!(repository.review_flags().is_empty());
}
