use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

use super::policy::{AttributeClass, EnrichmentPolicy, ImageStep};
use crate::modules::catalog::domain::{
    attribute, AttributeProvenance, SourceTier, VenueImage, VenueRecord, VenueRepository,
    VenueVideo,
};
use crate::modules::matcher;
use crate::modules::provider::domain::{
    ImageHit, ImageSearchProvider, PageMetadataProvider, PlaceHit, PlaceSearchProvider,
    VideoSearchProvider,
};
use crate::shared::errors::{EngineError, EngineResult};
use crate::{log_debug, log_info, log_warn};

#[derive(Debug, Clone)]
pub struct EnrichmentOptions {
    pub dry_run: bool,
    pub targets: Vec<AttributeClass>,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            targets: AttributeClass::ALL.to_vec(),
        }
    }
}

/// What one record's enrichment pass did (or, in dry-run, would have done).
#[derive(Debug, Default, Clone)]
pub struct EnrichOutcome {
    pub images_added: usize,
    pub videos_added: usize,
    pub website_written: bool,
    pub coordinates_written: bool,
    /// Writes a dry run would have made.
    pub planned: usize,
    pub provider_failures: usize,
}

impl EnrichOutcome {
    pub fn wrote_anything(&self) -> bool {
        self.images_added > 0
            || self.videos_added > 0
            || self.website_written
            || self.coordinates_written
    }
}

/// Trust-ordered multi-provider fill for missing attributes.
///
/// Each attribute class walks its provider chain highest-trust first and
/// stops the moment the sufficiency target is met, so low-trust (and
/// high-cost) providers are only consulted when better sources came up
/// short. Provider failures are logged and count as empty results; they
/// never fail the record.
pub struct EnrichmentWaterfall {
    repository: Arc<dyn VenueRepository>,
    places: Arc<dyn PlaceSearchProvider>,
    images: Arc<dyn ImageSearchProvider>,
    videos: Arc<dyn VideoSearchProvider>,
    pages: Arc<dyn PageMetadataProvider>,
    policy: EnrichmentPolicy,
    video_id_pattern: Regex,
}

impl EnrichmentWaterfall {
    pub fn new(
        repository: Arc<dyn VenueRepository>,
        places: Arc<dyn PlaceSearchProvider>,
        images: Arc<dyn ImageSearchProvider>,
        videos: Arc<dyn VideoSearchProvider>,
        pages: Arc<dyn PageMetadataProvider>,
        policy: EnrichmentPolicy,
    ) -> EngineResult<Self> {
        let video_id_pattern = Regex::new(crate::modules::provider::domain::YOUTUBE_ID_PATTERN)
            .map_err(|e| EngineError::Configuration(format!("video id pattern: {}", e)))?;

        Ok(Self {
            repository,
            places,
            images,
            videos,
            pages,
            policy,
            video_id_pattern,
        })
    }

    pub fn policy(&self) -> &EnrichmentPolicy {
        &self.policy
    }

    pub async fn enrich_record(
        &self,
        record: &VenueRecord,
        options: &EnrichmentOptions,
    ) -> EngineResult<EnrichOutcome> {
        let mut outcome = EnrichOutcome::default();

        for class in &options.targets {
            match class {
                AttributeClass::Images => {
                    self.enrich_images(record, options, &mut outcome).await?
                }
                AttributeClass::Videos => {
                    self.enrich_videos(record, options, &mut outcome).await?
                }
                AttributeClass::Website => {
                    self.enrich_website(record, options, &mut outcome).await?
                }
                AttributeClass::Coordinates => {
                    self.enrich_coordinates(record, options, &mut outcome).await?
                }
            }
        }

        Ok(outcome)
    }

    async fn enrich_images(
        &self,
        record: &VenueRecord,
        options: &EnrichmentOptions,
        outcome: &mut EnrichOutcome,
    ) -> EngineResult<()> {
        let have = record.countable_image_count();
        let target = self.policy.image_target;
        if have >= target {
            log_debug!("{}: image target already met ({}/{})", record.id, have, target);
            return Ok(());
        }

        let mut accepted: Vec<VenueImage> = Vec::new();
        let mut seen: HashSet<String> = record.images.iter().map(|i| i.url.clone()).collect();
        let mut next_position = record.next_image_position();
        let location = record.display_location();

        for step in self.policy.image_chain() {
            let countable = accepted
                .iter()
                .filter(|i| !i.source_tier.is_placeholder())
                .count();
            let need = target.saturating_sub(have + countable);
            if need == 0 {
                break;
            }

            match step {
                ImageStep::OfficialPage => {
                    let Some(website) = record.website.as_deref().filter(|w| !w.trim().is_empty())
                    else {
                        continue;
                    };
                    match self.pages.fetch_meta_image(website).await {
                        Ok(Some(hit)) => {
                            self.accept_hits(
                                std::slice::from_ref(&hit),
                                SourceTier::Official,
                                need,
                                false,
                                None,
                                &mut seen,
                                &mut accepted,
                                &mut next_position,
                            );
                        }
                        Ok(None) => {}
                        Err(e) => {
                            log_warn!("{}: page metadata fetch failed: {}", record.id, e);
                            outcome.provider_failures += 1;
                        }
                    }
                }
                ImageStep::CuratedSearch => {
                    let query = self.policy.curated_query(&record.name, &location);
                    let hits = self.image_hits(record, &query, outcome).await;
                    self.accept_hits(
                        &hits,
                        SourceTier::Curated,
                        need,
                        false,
                        None,
                        &mut seen,
                        &mut accepted,
                        &mut next_position,
                    );
                }
                ImageStep::GeneralSearch => {
                    let query = self.policy.general_image_query(&record.name, &location);
                    let hits = self.image_hits(record, &query, outcome).await;
                    // Allowlisted-domain pass first, then the size-floor
                    // pass over whatever is still missing.
                    let taken = self.accept_hits(
                        &hits,
                        SourceTier::Allowlisted,
                        need,
                        true,
                        None,
                        &mut seen,
                        &mut accepted,
                        &mut next_position,
                    );
                    if taken < need {
                        self.accept_hits(
                            &hits,
                            SourceTier::General,
                            need - taken,
                            false,
                            Some(self.policy.min_image_edge),
                            &mut seen,
                            &mut accepted,
                            &mut next_position,
                        );
                    }
                }
                ImageStep::VideoThumbnail => {
                    for video in &record.videos {
                        if let Some(id) = self.youtube_id(&video.url) {
                            let hit = ImageHit::bare(&format!(
                                "https://img.youtube.com/vi/{}/hqdefault.jpg",
                                id
                            ));
                            let taken = self.accept_hits(
                                std::slice::from_ref(&hit),
                                SourceTier::VideoDerived,
                                need,
                                false,
                                None,
                                &mut seen,
                                &mut accepted,
                                &mut next_position,
                            );
                            if taken > 0 {
                                break;
                            }
                        }
                    }
                }
                ImageStep::StockFallback => {
                    // Placeholders only for records with nothing at all, and
                    // they never count toward the target.
                    if !record.images.is_empty() || !accepted.is_empty() {
                        continue;
                    }
                    let region = record.region.as_deref().unwrap_or("");
                    let url = self.policy.stock_image_for(region);
                    if seen.insert(url.to_string()) {
                        accepted.push(VenueImage::new(
                            url.to_string(),
                            SourceTier::Stock,
                            next_position,
                        ));
                        next_position += 1;
                    }
                }
            }
        }

        if accepted.is_empty() {
            log_debug!("{}: no image candidates anywhere, leaving for a later run", record.id);
            return Ok(());
        }

        if options.dry_run {
            outcome.planned += accepted.len();
            log_info!(
                "[dry-run] {}: would add {} images ({})",
                record.id,
                accepted.len(),
                summarize_tiers(&accepted)
            );
            return Ok(());
        }

        let written = self.repository.upsert_images(&record.id, &accepted).await?;
        outcome.images_added += written;
        log_info!(
            "{}: added {} images ({})",
            record.id,
            written,
            summarize_tiers(&accepted)
        );
        Ok(())
    }

    async fn enrich_videos(
        &self,
        record: &VenueRecord,
        options: &EnrichmentOptions,
        outcome: &mut EnrichOutcome,
    ) -> EngineResult<()> {
        if record.videos.len() >= self.policy.video_target {
            return Ok(());
        }

        let query = self
            .policy
            .video_query(&record.name, &record.display_location());
        let hits = match self
            .videos
            .search_videos(&query, self.policy.video_fetch_limit)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                log_warn!("{}: video search failed: {}", record.id, e);
                outcome.provider_failures += 1;
                return Ok(());
            }
        };

        let need = self.policy.video_target - record.videos.len();
        let mut position = record.next_video_position();
        let mut accepted: Vec<VenueVideo> = Vec::new();

        for hit in hits {
            if accepted.len() >= need {
                break;
            }
            if record.has_video_url(&hit.url) || accepted.iter().any(|v| v.url == hit.url) {
                continue;
            }
            if !matcher::title_is_relevant(&hit.title, &record.name) {
                log_debug!("{}: skipping irrelevant video '{}'", record.id, hit.title);
                continue;
            }
            accepted.push(VenueVideo {
                url: hit.url,
                title: hit.title,
                position,
            });
            position += 1;
        }

        if accepted.is_empty() {
            return Ok(());
        }

        if options.dry_run {
            outcome.planned += accepted.len();
            log_info!("[dry-run] {}: would add {} videos", record.id, accepted.len());
            return Ok(());
        }

        let written = self.repository.upsert_videos(&record.id, &accepted).await?;
        self.repository
            .upsert_provenance(
                &record.id,
                attribute::VIDEOS,
                &AttributeProvenance::new(SourceTier::Curated, "video-search"),
            )
            .await?;
        outcome.videos_added += written;
        log_info!("{}: added {} videos", record.id, written);
        Ok(())
    }

    async fn enrich_website(
        &self,
        record: &VenueRecord,
        options: &EnrichmentOptions,
        outcome: &mut EnrichOutcome,
    ) -> EngineResult<()> {
        let blank = record.website.as_deref().map(str::trim).unwrap_or("").is_empty();
        if !blank {
            match record.attribute_tier(attribute::WEBSITE) {
                // Only a strictly lower recorded tier may be upgraded.
                Some(tier) if SourceTier::Authoritative.outranks(&tier) => {}
                // Authoritative already, or untagged manual data: keep it.
                _ => return Ok(()),
            }
        }

        let Some(hit) = self.place_hit(record, outcome).await else {
            return Ok(());
        };
        let Some(website) = hit.website.filter(|w| !w.trim().is_empty()) else {
            log_debug!("{}: place hit has no website", record.id);
            return Ok(());
        };
        if record.website.as_deref() == Some(website.as_str()) {
            return Ok(());
        }

        if options.dry_run {
            outcome.planned += 1;
            log_info!("[dry-run] {}: would set website to {}", record.id, website);
            return Ok(());
        }

        let mut updated = record.clone();
        updated.website = Some(website.clone());
        self.repository.update_fields(&updated).await?;
        self.repository
            .upsert_provenance(
                &record.id,
                attribute::WEBSITE,
                &AttributeProvenance::new(SourceTier::Authoritative, "places"),
            )
            .await?;
        outcome.website_written = true;
        log_info!("{}: website set to {}", record.id, website);
        Ok(())
    }

    async fn enrich_coordinates(
        &self,
        record: &VenueRecord,
        options: &EnrichmentOptions,
        outcome: &mut EnrichOutcome,
    ) -> EngineResult<()> {
        // Filling is this module's job; correcting populated coordinates
        // belongs to verification.
        if record.coordinates.is_some() {
            return Ok(());
        }

        let Some(hit) = self.place_hit(record, outcome).await else {
            return Ok(());
        };

        if options.dry_run {
            outcome.planned += 1;
            log_info!(
                "[dry-run] {}: would set coordinates to {}",
                record.id,
                hit.coordinates
            );
            return Ok(());
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
        outcome.coordinates_written = true;
        log_info!("{}: coordinates set to {}", record.id, hit.coordinates);
        Ok(())
    }

    async fn place_hit(
        &self,
        record: &VenueRecord,
        outcome: &mut EnrichOutcome,
    ) -> Option<PlaceHit> {
        let query = self
            .policy
            .place_query(&record.name, &record.display_location());
        match self.places.search_place(&query).await {
            Ok(hit) => {
                if hit.is_none() {
                    log_debug!("{}: no place match for '{}'", record.id, query);
                }
                hit
            }
            Err(e) => {
                log_warn!("{}: place search failed: {}", record.id, e);
                outcome.provider_failures += 1;
                None
            }
        }
    }

    async fn image_hits(
        &self,
        record: &VenueRecord,
        query: &str,
        outcome: &mut EnrichOutcome,
    ) -> Vec<ImageHit> {
        match self
            .images
            .search_images(query, self.policy.image_fetch_limit)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                log_warn!("{}: image search failed: {}", record.id, e);
                outcome.provider_failures += 1;
                Vec::new()
            }
        }
    }

    /// Filters candidates through the blocklist, the optional allowlist
    /// requirement, the optional size floor, and URL dedup, appending
    /// survivors to `accepted` with the given tier. Returns how many made it.
    #[allow(clippy::too_many_arguments)]
    fn accept_hits(
        &self,
        hits: &[ImageHit],
        tier: SourceTier,
        need: usize,
        require_allowlist: bool,
        size_floor: Option<u32>,
        seen: &mut HashSet<String>,
        accepted: &mut Vec<VenueImage>,
        next_position: &mut i32,
    ) -> usize {
        let mut taken = 0;
        for hit in hits {
            if taken >= need {
                break;
            }
            if seen.contains(&hit.url) {
                continue;
            }
            if self.policy.is_blocklisted(&hit.url) {
                continue;
            }
            if let Some(context) = hit.context_url.as_deref() {
                if self.policy.is_blocklisted(context) {
                    continue;
                }
            }
            if require_allowlist {
                let allowed = self.policy.is_allowlisted(&hit.url)
                    || hit
                        .context_url
                        .as_deref()
                        .map(|c| self.policy.is_allowlisted(c))
                        .unwrap_or(false);
                if !allowed {
                    continue;
                }
            }
            if let Some(floor) = size_floor {
                if !hit.meets_size_floor(floor) {
                    continue;
                }
            }

            seen.insert(hit.url.clone());
            accepted.push(VenueImage::new(hit.url.clone(), tier, *next_position));
            *next_position += 1;
            taken += 1;
        }
        taken
    }

    fn youtube_id(&self, url: &str) -> Option<String> {
        self.video_id_pattern
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

fn summarize_tiers(images: &[VenueImage]) -> String {
    images
        .iter()
        .map(|i| i.source_tier.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
