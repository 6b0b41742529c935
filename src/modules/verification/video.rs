use regex::Regex;
use std::sync::Arc;

use super::flags;
use crate::modules::catalog::domain::{
    attribute, AttributeProvenance, SourceTier, VenueRecord, VenueRepository, VenueVideo,
};
use crate::modules::enrichment::EnrichmentPolicy;
use crate::modules::matcher;
use crate::modules::provider::domain::{VideoSearchProvider, YOUTUBE_ID_PATTERN};
use crate::shared::errors::{EngineError, EngineResult};
use crate::{log_debug, log_info};

#[derive(Debug, Clone, Default)]
pub struct VideoOptions {
    pub fix: bool,
}

/// Why a stored video failed verification, or `Valid` when it passed.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoStatus {
    /// Still resolvable upstream and the title still matches the venue.
    Valid,
    /// Upstream lookup returned nothing: deleted or made private.
    Gone,
    /// Still up, but the title no longer looks like this venue.
    Irrelevant { title: String },
    /// URL we cannot extract a video id from.
    Malformed,
}

impl VideoStatus {
    pub fn label(&self) -> &'static str {
        match self {
            VideoStatus::Valid => "valid",
            VideoStatus::Gone => "gone",
            VideoStatus::Irrelevant { .. } => "irrelevant",
            VideoStatus::Malformed => "malformed",
        }
    }
}

/// Verdict for one stored video, plus what fix mode did about it.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFinding {
    pub url: String,
    pub status: VideoStatus,
    /// URL of the replacement swapped in, when fix mode found one.
    pub replacement: Option<String>,
    pub flagged: bool,
}

impl VideoFinding {
    pub fn is_valid(&self) -> bool {
        matches!(self.status, VideoStatus::Valid)
    }
}

/// Re-checks stored videos against the video provider: the video must still
/// exist and its current title must still look like the venue. Fix mode
/// swaps failures for the first search candidate that is relevant and still
/// resolvable, keeping the failed video's position.
pub struct VideoVerifier {
    repository: Arc<dyn VenueRepository>,
    videos: Arc<dyn VideoSearchProvider>,
    policy: EnrichmentPolicy,
    id_pattern: Regex,
}

impl VideoVerifier {
    pub fn new(
        repository: Arc<dyn VenueRepository>,
        videos: Arc<dyn VideoSearchProvider>,
        policy: EnrichmentPolicy,
    ) -> EngineResult<Self> {
        let id_pattern = Regex::new(YOUTUBE_ID_PATTERN)
            .map_err(|e| EngineError::Configuration(format!("video id pattern: {}", e)))?;
        Ok(Self {
            repository,
            videos,
            policy,
            id_pattern,
        })
    }

    /// One finding per stored video, in stored order. Records without
    /// videos yield an empty list.
    pub async fn verify_record(
        &self,
        record: &VenueRecord,
        options: &VideoOptions,
    ) -> EngineResult<Vec<VideoFinding>> {
        let mut findings = Vec::with_capacity(record.videos.len());
        for video in &record.videos {
            findings.push(self.verify_video(record, video, options).await?);
        }
        Ok(findings)
    }

    async fn verify_video(
        &self,
        record: &VenueRecord,
        video: &VenueVideo,
        options: &VideoOptions,
    ) -> EngineResult<VideoFinding> {
        let status = self.classify(record, video).await?;
        if status == VideoStatus::Valid || !options.fix {
            return Ok(VideoFinding {
                url: video.url.clone(),
                status,
                replacement: None,
                flagged: false,
            });
        }

        if let Some(replacement) = self.find_replacement(record, video).await? {
            self.repository.delete_video(&record.id, &video.url).await?;
            self.repository
                .upsert_videos(&record.id, std::slice::from_ref(&replacement))
                .await?;
            self.repository
                .upsert_provenance(
                    &record.id,
                    attribute::VIDEOS,
                    &AttributeProvenance::new(SourceTier::Curated, "video-search"),
                )
                .await?;
            log_info!(
                "{}: replaced {} video {} with {}",
                record.id,
                status.label(),
                video.url,
                replacement.url
            );
            return Ok(VideoFinding {
                url: video.url.clone(),
                status,
                replacement: Some(replacement.url),
                flagged: false,
            });
        }

        self.repository
            .flag_for_review(
                &record.id,
                flags::VIDEO_UNVERIFIABLE,
                &format!(
                    "stored video {} is {} and no search candidate passed the checks",
                    video.url,
                    status.label()
                ),
            )
            .await?;
        Ok(VideoFinding {
            url: video.url.clone(),
            status,
            replacement: None,
            flagged: true,
        })
    }

    async fn classify(
        &self,
        record: &VenueRecord,
        video: &VenueVideo,
    ) -> EngineResult<VideoStatus> {
        let Some(id) = self.youtube_id(&video.url) else {
            return Ok(VideoStatus::Malformed);
        };
        let Some(meta) = self.videos.fetch_video_metadata(&id).await? else {
            return Ok(VideoStatus::Gone);
        };
        if matcher::title_is_relevant(&meta.title, &record.name) {
            Ok(VideoStatus::Valid)
        } else {
            log_debug!(
                "{}: video {} drifted to unrelated title '{}'",
                record.id,
                video.url,
                meta.title
            );
            Ok(VideoStatus::Irrelevant { title: meta.title })
        }
    }

    /// First search candidate that is not already stored, has a relevant
    /// title, and still resolves upstream. The replacement inherits the
    /// failed video's position so ordering stays stable.
    async fn find_replacement(
        &self,
        record: &VenueRecord,
        failing: &VenueVideo,
    ) -> EngineResult<Option<VenueVideo>> {
        let query = self
            .policy
            .video_query(&record.name, &record.display_location());
        let hits = self
            .videos
            .search_videos(&query, self.policy.video_fetch_limit)
            .await?;

        for hit in hits {
            if record.has_video_url(&hit.url) {
                continue;
            }
            if !matcher::title_is_relevant(&hit.title, &record.name) {
                continue;
            }
            // Confirm the candidate itself resolves before swapping it in.
            let Some(meta) = self.videos.fetch_video_metadata(&hit.video_id).await? else {
                log_debug!("{}: replacement candidate {} is itself gone", record.id, hit.url);
                continue;
            };
            return Ok(Some(VenueVideo {
                url: hit.url,
                title: meta.title,
                position: failing.position,
            }));
        }
        Ok(None)
    }

    fn youtube_id(&self, url: &str) -> Option<String> {
        self.id_pattern
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}
