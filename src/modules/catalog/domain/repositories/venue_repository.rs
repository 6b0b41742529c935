use crate::modules::catalog::domain::entities::{
    AttributeProvenance, VenueImage, VenueRecord, VenueVideo,
};
use crate::modules::catalog::domain::value_objects::VenueSetting;
use crate::shared::errors::EngineResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Slice selection for batch runs. Results are always ordered by id so a
/// `(filter, offset)` pair names a stable continuation point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VenueFilter {
    pub region: Option<String>,
    pub country: Option<String>,
    pub id_prefix: Option<String>,
    pub limit: Option<i64>,
    pub offset: i64,
}

impl VenueFilter {
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }

    pub fn with_country(mut self, country: &str) -> Self {
        self.country = Some(country.to_string());
        self
    }

    pub fn with_id_prefix(mut self, prefix: &str) -> Self {
        self.id_prefix = Some(prefix.to_string());
        self
    }
}

/// Gateway to the venue store. All writes are conflict-keyed upserts so
/// re-running a batch over the same slice is idempotent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VenueRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> EngineResult<Option<VenueRecord>>;

    /// Load a filtered, id-ordered slice of full aggregates.
    async fn query(&self, filter: &VenueFilter) -> EngineResult<Vec<VenueRecord>>;

    async fn count(&self, filter: &VenueFilter) -> EngineResult<i64>;

    /// Lightweight (id, name) listing for duplicate scans.
    async fn list_names(&self, filter: &VenueFilter) -> EngineResult<Vec<(String, String)>>;

    /// Persist scalar columns of the record. Absent optional fields are
    /// left untouched rather than nulled.
    async fn update_fields(&self, venue: &VenueRecord) -> EngineResult<()>;

    async fn upsert_images(&self, venue_id: &str, images: &[VenueImage]) -> EngineResult<usize>;

    async fn upsert_videos(&self, venue_id: &str, videos: &[VenueVideo]) -> EngineResult<usize>;

    async fn delete_video(&self, venue_id: &str, url: &str) -> EngineResult<bool>;

    /// Attach classification names, creating unknown classifications on the
    /// fly.
    async fn upsert_type_links(&self, venue_id: &str, type_names: &[String])
        -> EngineResult<usize>;

    async fn upsert_setting_links(
        &self,
        venue_id: &str,
        settings: &[VenueSetting],
    ) -> EngineResult<usize>;

    async fn upsert_provenance(
        &self,
        venue_id: &str,
        attr: &str,
        provenance: &AttributeProvenance,
    ) -> EngineResult<()>;

    /// Queue a record for human review. Keyed by kind, so repeated runs
    /// refresh the detail instead of stacking duplicates.
    async fn flag_for_review(&self, venue_id: &str, flag_kind: &str, detail: &str)
        -> EngineResult<()>;

    /// Record the outcome of an audit pass (score + timestamp).
    async fn record_audit(&self, venue_id: &str, completeness: i32) -> EngineResult<()>;
}
