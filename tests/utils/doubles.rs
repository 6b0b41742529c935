/// Scripted stand-ins for the repository and provider seams.
///
/// Integration tests run without Postgres or network access, so the store is
/// an in-memory map with the same filter and upsert semantics as the Diesel
/// implementation, and the providers replay scripted responses while logging
/// every query they receive.
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use verity_lib::modules::catalog::domain::{
    AttributeProvenance, VenueFilter, VenueImage, VenueRecord, VenueRepository, VenueSetting,
    VenueVideo,
};
use verity_lib::modules::provider::domain::{
    ImageHit, ImageSearchProvider, PageMetadataProvider, PlaceHit, PlaceSearchProvider, VideoHit,
    VideoMetadata, VideoSearchProvider,
};
use verity_lib::shared::errors::{EngineResult, ProviderError};

/// In-memory venue store keyed by id, so listings come back id-ordered like
/// the real repository's queries.
#[derive(Default)]
pub struct InMemoryVenueRepository {
    records: Mutex<BTreeMap<String, VenueRecord>>,
    review_flags: Mutex<Vec<(String, String, String)>>,
}

impl InMemoryVenueRepository {
    pub fn seeded(records: Vec<VenueRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            records: Mutex::new(map),
            review_flags: Mutex::new(Vec::new()),
        }
    }

    pub fn get(&self, id: &str) -> VenueRecord {
        self.records
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_else(|| panic!("venue '{}' was never seeded", id))
    }

    /// (venue id, flag kind, detail) triples, in write order.
    pub fn review_flags(&self) -> Vec<(String, String, String)> {
        self.review_flags.lock().unwrap().clone()
    }

    fn matches(filter: &VenueFilter, record: &VenueRecord) -> bool {
        if let Some(region) = filter.region.as_deref() {
            if record.region.as_deref() != Some(region) {
                return false;
            }
        }
        if let Some(country) = filter.country.as_deref() {
            if record.country.as_deref() != Some(country) {
                return false;
            }
        }
        if let Some(prefix) = filter.id_prefix.as_deref() {
            if !record.id.starts_with(prefix) {
                return false;
            }
        }
        true
    }

    fn slice(&self, filter: &VenueFilter) -> Vec<VenueRecord> {
        let records = self.records.lock().unwrap();
        let mut matching: Vec<VenueRecord> = records
            .values()
            .filter(|r| Self::matches(filter, r))
            .skip(filter.offset.max(0) as usize)
            .cloned()
            .collect();
        if let Some(limit) = filter.limit {
            matching.truncate(limit.max(0) as usize);
        }
        matching
    }
}

#[async_trait]
impl VenueRepository for InMemoryVenueRepository {
    async fn find_by_id(&self, id: &str) -> EngineResult<Option<VenueRecord>> {
        Ok(self.records.lock().unwrap().get(id).cloned())
    }

    async fn query(&self, filter: &VenueFilter) -> EngineResult<Vec<VenueRecord>> {
        Ok(self.slice(filter))
    }

    async fn count(&self, filter: &VenueFilter) -> EngineResult<i64> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| Self::matches(filter, r))
            .count() as i64)
    }

    async fn list_names(&self, filter: &VenueFilter) -> EngineResult<Vec<(String, String)>> {
        Ok(self
            .slice(filter)
            .into_iter()
            .map(|r| (r.id, r.name))
            .collect())
    }

    async fn update_fields(&self, venue: &VenueRecord) -> EngineResult<()> {
        let mut records = self.records.lock().unwrap();
        let stored = records
            .get_mut(&venue.id)
            .unwrap_or_else(|| panic!("venue '{}' was never seeded", venue.id));

        stored.name = venue.name.clone();
        stored.capacity = venue.capacity;
        stored.price = venue.price;
        // Absent optional fields leave the stored value untouched.
        macro_rules! keep_or_set {
            ($field:ident) => {
                if venue.$field.is_some() {
                    stored.$field = venue.$field.clone();
                }
            };
        }
        keep_or_set!(region);
        keep_or_set!(country);
        keep_or_set!(subregion);
        keep_or_set!(address);
        keep_or_set!(description);
        keep_or_set!(website);
        keep_or_set!(phone);
        keep_or_set!(coordinates);
        keep_or_set!(rating);
        keep_or_set!(review_count);
        keep_or_set!(completeness);
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn upsert_images(&self, venue_id: &str, images: &[VenueImage]) -> EngineResult<usize> {
        let mut records = self.records.lock().unwrap();
        let stored = records.get_mut(venue_id).expect("venue not seeded");
        for image in images {
            match stored.images.iter_mut().find(|i| i.url == image.url) {
                Some(existing) => *existing = image.clone(),
                None => stored.images.push(image.clone()),
            }
        }
        Ok(images.len())
    }

    async fn upsert_videos(&self, venue_id: &str, videos: &[VenueVideo]) -> EngineResult<usize> {
        let mut records = self.records.lock().unwrap();
        let stored = records.get_mut(venue_id).expect("venue not seeded");
        for video in videos {
            match stored.videos.iter_mut().find(|v| v.url == video.url) {
                Some(existing) => *existing = video.clone(),
                None => stored.videos.push(video.clone()),
            }
        }
        Ok(videos.len())
    }

    async fn delete_video(&self, venue_id: &str, url: &str) -> EngineResult<bool> {
        let mut records = self.records.lock().unwrap();
        let stored = records.get_mut(venue_id).expect("venue not seeded");
        let before = stored.videos.len();
        stored.videos.retain(|v| v.url != url);
        Ok(stored.videos.len() < before)
    }

    async fn upsert_type_links(
        &self,
        venue_id: &str,
        type_names: &[String],
    ) -> EngineResult<usize> {
        let mut records = self.records.lock().unwrap();
        let stored = records.get_mut(venue_id).expect("venue not seeded");
        let mut added = 0;
        for name in type_names {
            if !stored.venue_types.contains(name) {
                stored.venue_types.push(name.clone());
                added += 1;
            }
        }
        Ok(added)
    }

    async fn upsert_setting_links(
        &self,
        venue_id: &str,
        settings: &[VenueSetting],
    ) -> EngineResult<usize> {
        let mut records = self.records.lock().unwrap();
        let stored = records.get_mut(venue_id).expect("venue not seeded");
        let mut added = 0;
        for setting in settings {
            if !stored.settings.contains(setting) {
                stored.settings.push(*setting);
                added += 1;
            }
        }
        Ok(added)
    }

    async fn upsert_provenance(
        &self,
        venue_id: &str,
        attr: &str,
        provenance: &AttributeProvenance,
    ) -> EngineResult<()> {
        let mut records = self.records.lock().unwrap();
        let stored = records.get_mut(venue_id).expect("venue not seeded");
        stored
            .provenance
            .insert(attr.to_string(), provenance.clone());
        Ok(())
    }

    async fn flag_for_review(
        &self,
        venue_id: &str,
        flag_kind: &str,
        detail: &str,
    ) -> EngineResult<()> {
        let mut flags = self.review_flags.lock().unwrap();
        match flags
            .iter_mut()
            .find(|(id, kind, _)| id == venue_id && kind == flag_kind)
        {
            Some(existing) => existing.2 = detail.to_string(),
            None => flags.push((
                venue_id.to_string(),
                flag_kind.to_string(),
                detail.to_string(),
            )),
        }
        Ok(())
    }

    async fn record_audit(&self, venue_id: &str, completeness: i32) -> EngineResult<()> {
        let mut records = self.records.lock().unwrap();
        let stored = records.get_mut(venue_id).expect("venue not seeded");
        stored.completeness = Some(completeness);
        stored.last_audited_at = Some(Utc::now());
        Ok(())
    }
}

/// Place index that always returns the same hit (or nothing).
#[derive(Default)]
pub struct ScriptedPlaces {
    hit: Option<PlaceHit>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedPlaces {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_hit(hit: PlaceHit) -> Self {
        Self {
            hit: Some(hit),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaceSearchProvider for ScriptedPlaces {
    async fn search_place(&self, query: &str) -> Result<Option<PlaceHit>, ProviderError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.hit.clone())
    }
}

/// Image search scripted call by call: responses pop in order, then the
/// provider acts empty.
#[derive(Default)]
pub struct ScriptedImages {
    responses: Mutex<VecDeque<Result<Vec<ImageHit>, ProviderError>>>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedImages {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn then(self, hits: Vec<ImageHit>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(hits));
        self
    }

    pub fn then_error(self, err: ProviderError) -> Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageSearchProvider for ScriptedImages {
    async fn search_images(
        &self,
        query: &str,
        _limit: usize,
    ) -> Result<Vec<ImageHit>, ProviderError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Video provider with fixed search results and a map of resolvable videos.
/// An id absent from the map looks deleted upstream.
#[derive(Default)]
pub struct ScriptedVideos {
    search_hits: Vec<VideoHit>,
    metadata: HashMap<String, VideoMetadata>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedVideos {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_search_hits(mut self, hits: Vec<VideoHit>) -> Self {
        self.search_hits = hits;
        self
    }

    pub fn knowing(mut self, video_id: &str, title: &str) -> Self {
        self.metadata.insert(
            video_id.to_string(),
            VideoMetadata {
                title: title.to_string(),
            },
        );
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl VideoSearchProvider for ScriptedVideos {
    async fn search_videos(
        &self,
        query: &str,
        _limit: usize,
    ) -> Result<Vec<VideoHit>, ProviderError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.search_hits.clone())
    }

    async fn fetch_video_metadata(
        &self,
        video_id: &str,
    ) -> Result<Option<VideoMetadata>, ProviderError> {
        Ok(self.metadata.get(video_id).cloned())
    }
}

/// Page scraper that always reports the same og:image (or none).
#[derive(Default)]
pub struct ScriptedPages {
    image: Option<ImageHit>,
    fetched: Mutex<Vec<String>>,
}

impl ScriptedPages {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_image(hit: ImageHit) -> Self {
        Self {
            image: Some(hit),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }
}

#[async_trait]
impl PageMetadataProvider for ScriptedPages {
    async fn fetch_meta_image(&self, page_url: &str) -> Result<Option<ImageHit>, ProviderError> {
        self.fetched.lock().unwrap().push(page_url.to_string());
        Ok(self.image.clone())
    }
}
