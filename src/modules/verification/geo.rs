use std::sync::Arc;

use super::flags;
use crate::modules::catalog::domain::{
    attribute, AttributeProvenance, Coordinates, SourceTier, VenueRecord, VenueRepository,
};
use crate::modules::enrichment::EnrichmentPolicy;
use crate::modules::matcher;
use crate::modules::provider::domain::PlaceSearchProvider;
use crate::shared::errors::EngineResult;
use crate::{log_debug, log_info, log_warn};

/// Divergence up to this many meters counts as agreement.
pub const DEFAULT_THRESHOLD_METERS: f64 = 500.0;

/// Beyond this the place match is too far to trust for auto-correction.
pub const DEFAULT_CORRECTION_CAP_METERS: f64 = 50_000.0;

#[derive(Debug, Clone)]
pub struct GeoOptions {
    pub fix: bool,
    pub threshold_m: f64,
    pub max_correction_m: f64,
}

impl Default for GeoOptions {
    fn default() -> Self {
        Self {
            fix: false,
            threshold_m: DEFAULT_THRESHOLD_METERS,
            max_correction_m: DEFAULT_CORRECTION_CAP_METERS,
        }
    }
}

/// Outcome of checking one record's coordinates against the place index.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoFinding {
    /// Stored coordinates agree with the index within the threshold.
    Confirmed { distance_m: f64 },
    /// Divergence within the correction cap. `applied` is set when fix mode
    /// actually moved the record.
    Corrected {
        distance_m: f64,
        to: Coordinates,
        applied: bool,
    },
    /// Divergence beyond the cap. Never auto-corrected; `name_affinity`
    /// (0..=1) hints whether the index matched a different venue entirely.
    OutOfRange {
        distance_m: f64,
        name_affinity: f64,
        flagged: bool,
    },
    /// The place index had nothing to compare against.
    Unresolved,
    /// Record has no stored coordinates; filling them is enrichment's job.
    NoCoordinates,
}

impl GeoFinding {
    pub fn needs_attention(&self) -> bool {
        matches!(
            self,
            GeoFinding::Corrected { applied: false, .. }
                | GeoFinding::OutOfRange { .. }
                | GeoFinding::Unresolved
        )
    }
}

/// Checks stored coordinates against a fresh place lookup.
///
/// Shares the enrichment policy's query builder so verification resolves a
/// venue through exactly the query enrichment would have used.
pub struct GeoVerifier {
    repository: Arc<dyn VenueRepository>,
    places: Arc<dyn PlaceSearchProvider>,
    policy: EnrichmentPolicy,
}

impl GeoVerifier {
    pub fn new(
        repository: Arc<dyn VenueRepository>,
        places: Arc<dyn PlaceSearchProvider>,
        policy: EnrichmentPolicy,
    ) -> Self {
        Self {
            repository,
            places,
            policy,
        }
    }

    pub async fn verify_record(
        &self,
        record: &VenueRecord,
        options: &GeoOptions,
    ) -> EngineResult<GeoFinding> {
        let Some(stored) = record.coordinates else {
            return Ok(GeoFinding::NoCoordinates);
        };

        let query = self
            .policy
            .place_query(&record.name, &record.display_location());
        let Some(hit) = self.places.search_place(&query).await? else {
            log_debug!("{}: place index has no match for '{}'", record.id, query);
            return Ok(GeoFinding::Unresolved);
        };

        let distance_m = stored.distance_meters(&hit.coordinates);
        if distance_m <= options.threshold_m {
            log_debug!("{}: coordinates confirmed ({:.0} m off)", record.id, distance_m);
            return Ok(GeoFinding::Confirmed { distance_m });
        }

        if distance_m <= options.max_correction_m {
            if !options.fix {
                return Ok(GeoFinding::Corrected {
                    distance_m,
                    to: hit.coordinates,
                    applied: false,
                });
            }
            let mut updated = record.clone();
            updated.coordinates = Some(hit.coordinates);
            self.repository.update_fields(&updated).await?;
            self.repository
                .upsert_provenance(
                    &record.id,
                    attribute::COORDINATES,
                    &AttributeProvenance::new(SourceTier::Authoritative, "places"),
                )
                .await?;
            log_info!(
                "{}: coordinates moved {:.0} m to {}",
                record.id,
                distance_m,
                hit.coordinates
            );
            return Ok(GeoFinding::Corrected {
                distance_m,
                to: hit.coordinates,
                applied: true,
            });
        }

        // Too far to correct blindly: either the record is badly wrong or
        // the index matched some other venue. A reviewer can tell the two
        // apart from the name affinity.
        let name_affinity = strsim::jaro_winkler(
            &matcher::normalize(&record.name),
            &matcher::normalize(&hit.name),
        );
        log_warn!(
            "{}: place match '{}' is {:.1} km away (name affinity {:.2})",
            record.id,
            hit.name,
            distance_m / 1000.0,
            name_affinity
        );
        let flagged = options.fix;
        if flagged {
            self.repository
                .flag_for_review(
                    &record.id,
                    flags::GEO_DIVERGENCE,
                    &format!(
                        "place match '{}' is {:.1} km from stored coordinates (name affinity {:.2})",
                        hit.name,
                        distance_m / 1000.0,
                        name_affinity
                    ),
                )
                .await?;
        }
        Ok(GeoFinding::OutOfRange {
            distance_m,
            name_affinity,
            flagged,
        })
    }
}
