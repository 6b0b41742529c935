use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use tokio::task;
use uuid::Uuid;

use crate::log_debug;

use crate::modules::catalog::domain::{
    AttributeProvenance, CapacityRange, Coordinates, PriceRange, VenueFilter, VenueImage,
    VenueRecord, VenueRepository, VenueSetting, VenueVideo,
};
use crate::modules::catalog::infrastructure::models::*;
use crate::schema::{
    attribute_provenance, review_flags, venue_images, venue_setting_links, venue_type_links,
    venue_types, venue_videos, venues,
};
use crate::shared::errors::{EngineError, EngineResult};
use crate::shared::utils::Validator;
use crate::shared::Database;

type NameQuery<'a> =
    venues::BoxedQuery<'a, diesel::pg::Pg, (diesel::sql_types::Text, diesel::sql_types::Varchar)>;

pub struct VenueRepositoryImpl {
    db: Arc<Database>,
}

impl VenueRepositoryImpl {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // Helper: assemble the aggregate from its rows
    fn model_to_entity(
        row: VenueRow,
        images: Vec<VenueImageRow>,
        videos: Vec<VenueVideoRow>,
        type_names: Vec<String>,
        settings: Vec<VenueSetting>,
        provenance: Vec<ProvenanceRow>,
    ) -> VenueRecord {
        let coordinates = match (row.latitude, row.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        };

        VenueRecord {
            id: row.id,
            name: row.name,
            region: row.region,
            country: row.country,
            subregion: row.subregion,
            address: row.address,
            description: row.description,
            website: row.website,
            phone: row.phone,
            coordinates,
            capacity: CapacityRange::new(row.capacity_min, row.capacity_max),
            price: PriceRange {
                min: row.price_min,
                max: row.price_max,
                unit: row.price_unit,
            },
            rating: row.rating,
            review_count: row.review_count,
            completeness: row.completeness,
            venue_types: type_names,
            settings,
            images: images
                .into_iter()
                .map(|i| VenueImage {
                    url: i.url,
                    source_tier: i.source_tier,
                    description: i.description,
                    position: i.position,
                })
                .collect(),
            videos: videos
                .into_iter()
                .map(|v| VenueVideo {
                    url: v.url,
                    title: v.title,
                    position: v.position,
                })
                .collect(),
            provenance: provenance
                .into_iter()
                .map(|p| {
                    (
                        p.attribute,
                        AttributeProvenance {
                            source_tier: p.source_tier,
                            provider: p.provider,
                            recorded_at: p.recorded_at,
                        },
                    )
                })
                .collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_audited_at: row.last_audited_at,
        }
    }

    // Helper: scalar-column update payload
    fn entity_to_changeset(entity: &VenueRecord) -> VenueChangeset {
        VenueChangeset {
            name: entity.name.clone(),
            region: entity.region.clone(),
            country: entity.country.clone(),
            subregion: entity.subregion.clone(),
            address: entity.address.clone(),
            description: entity.description.clone(),
            website: entity.website.clone(),
            phone: entity.phone.clone(),
            latitude: entity.coordinates.map(|c| c.latitude),
            longitude: entity.coordinates.map(|c| c.longitude),
            capacity_min: entity.capacity.min,
            capacity_max: entity.capacity.max,
            price_min: entity.price.min,
            price_max: entity.price.max,
            price_unit: entity.price.unit,
            rating: entity.rating,
            review_count: entity.review_count,
            completeness: entity.completeness,
            updated_at: Utc::now(),
            last_audited_at: entity.last_audited_at,
        }
    }

    fn filtered(filter: &VenueFilter) -> venues::BoxedQuery<'static, diesel::pg::Pg> {
        let mut query = venues::table.into_boxed();

        if let Some(region) = &filter.region {
            query = query.filter(venues::region.eq(region.clone()));
        }
        if let Some(country) = &filter.country {
            query = query.filter(venues::country.eq(country.clone()));
        }
        if let Some(prefix) = &filter.id_prefix {
            query = query.filter(venues::id.like(format!("{}%", escape_like(prefix))));
        }

        query
    }

    /// Same filter set as [`Self::filtered`], applied to an (id, name)
    /// projection. Kept separate because a boxed query fixes its select
    /// clause at boxing time.
    fn filtered_names(filter: &VenueFilter) -> NameQuery<'static> {
        let mut query = venues::table
            .select((venues::id, venues::name))
            .into_boxed();

        if let Some(region) = &filter.region {
            query = query.filter(venues::region.eq(region.clone()));
        }
        if let Some(country) = &filter.country {
            query = query.filter(venues::country.eq(country.clone()));
        }
        if let Some(prefix) = &filter.id_prefix {
            query = query.filter(venues::id.like(format!("{}%", escape_like(prefix))));
        }

        query
    }

    /// Load aggregates for a page of venue rows in four batched queries
    /// instead of per-record round trips.
    async fn load_venues_with_relations(
        &self,
        venue_rows: Vec<VenueRow>,
    ) -> EngineResult<Vec<VenueRecord>> {
        if venue_rows.is_empty() {
            return Ok(Vec::new());
        }

        let db = Arc::clone(&self.db);

        let results = task::spawn_blocking(move || -> EngineResult<Vec<VenueRecord>> {
            let mut conn = db.get_connection()?;

            let image_rows: Vec<VenueImageRow> = VenueImageRow::belonging_to(&venue_rows)
                .order(venue_images::position.asc())
                .load::<VenueImageRow>(&mut conn)?;
            let grouped_images = image_rows.grouped_by(&venue_rows);

            let video_rows: Vec<VenueVideoRow> = VenueVideoRow::belonging_to(&venue_rows)
                .order(venue_videos::position.asc())
                .load::<VenueVideoRow>(&mut conn)?;
            let grouped_videos = video_rows.grouped_by(&venue_rows);

            let type_rows: Vec<(VenueTypeLink, VenueTypeRow)> =
                VenueTypeLink::belonging_to(&venue_rows)
                    .inner_join(venue_types::table)
                    .select((venue_type_links::all_columns, venue_types::all_columns))
                    .load::<(VenueTypeLink, VenueTypeRow)>(&mut conn)?;
            let grouped_types = type_rows.grouped_by(&venue_rows);

            let setting_rows: Vec<VenueSettingLink> =
                VenueSettingLink::belonging_to(&venue_rows).load::<VenueSettingLink>(&mut conn)?;
            let grouped_settings = setting_rows.grouped_by(&venue_rows);

            let provenance_rows: Vec<ProvenanceRow> =
                ProvenanceRow::belonging_to(&venue_rows).load::<ProvenanceRow>(&mut conn)?;
            let grouped_provenance = provenance_rows.grouped_by(&venue_rows);

            let out = venue_rows
                .into_iter()
                .zip(grouped_images)
                .zip(grouped_videos)
                .zip(grouped_types)
                .zip(grouped_settings)
                .zip(grouped_provenance)
                .map(|(((((row, images), videos), types), settings), provenance)| {
                    let type_names = types.into_iter().map(|(_, t)| t.name).collect();
                    let settings = settings.into_iter().map(|s| s.setting).collect();
                    Self::model_to_entity(row, images, videos, type_names, settings, provenance)
                })
                .collect::<Vec<_>>();

            Ok(out)
        })
        .await
        .map_err(|e| EngineError::Database(format!("Blocking task failed: {}", e)))??;

        Ok(results)
    }
}

#[async_trait]
impl VenueRepository for VenueRepositoryImpl {
    async fn find_by_id(&self, id: &str) -> EngineResult<Option<VenueRecord>> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        let row = task::spawn_blocking(move || -> EngineResult<Option<VenueRow>> {
            let mut conn = db.get_connection()?;
            let m = venues::table
                .filter(venues::id.eq(&id))
                .first::<VenueRow>(&mut conn)
                .optional()?;
            Ok(m)
        })
        .await
        .map_err(|e| EngineError::Database(format!("Blocking task failed: {}", e)))??;

        match row {
            Some(r) => {
                let v = self.load_venues_with_relations(vec![r]).await?;
                Ok(v.into_iter().next())
            }
            None => Ok(None),
        }
    }

    async fn query(&self, filter: &VenueFilter) -> EngineResult<Vec<VenueRecord>> {
        Validator::validate_slice(filter.offset, filter.limit)?;

        let db = Arc::clone(&self.db);
        let filter = filter.clone();

        let rows = task::spawn_blocking(move || -> EngineResult<Vec<VenueRow>> {
            let mut conn = db.get_connection()?;

            let mut query = Self::filtered(&filter)
                .order(venues::id.asc())
                .offset(filter.offset);
            if let Some(limit) = filter.limit {
                query = query.limit(limit);
            }

            Ok(query.load::<VenueRow>(&mut conn)?)
        })
        .await
        .map_err(|e| EngineError::Database(format!("Blocking task failed: {}", e)))??;

        log_debug!("Loaded {} venue rows for batch slice", rows.len());
        self.load_venues_with_relations(rows).await
    }

    async fn count(&self, filter: &VenueFilter) -> EngineResult<i64> {
        let db = Arc::clone(&self.db);
        let filter = filter.clone();

        task::spawn_blocking(move || -> EngineResult<i64> {
            let mut conn = db.get_connection()?;

            let mut query = venues::table
                .select(diesel::dsl::count_star())
                .into_boxed();
            if let Some(region) = &filter.region {
                query = query.filter(venues::region.eq(region.clone()));
            }
            if let Some(country) = &filter.country {
                query = query.filter(venues::country.eq(country.clone()));
            }
            if let Some(prefix) = &filter.id_prefix {
                query = query.filter(venues::id.like(format!("{}%", escape_like(prefix))));
            }

            Ok(query.get_result::<i64>(&mut conn)?)
        })
        .await
        .map_err(|e| EngineError::Database(format!("Blocking task failed: {}", e)))?
    }

    async fn list_names(&self, filter: &VenueFilter) -> EngineResult<Vec<(String, String)>> {
        Validator::validate_slice(filter.offset, filter.limit)?;

        let db = Arc::clone(&self.db);
        let filter = filter.clone();

        task::spawn_blocking(move || -> EngineResult<Vec<(String, String)>> {
            let mut conn = db.get_connection()?;

            let mut query = Self::filtered_names(&filter)
                .order(venues::id.asc())
                .offset(filter.offset);
            if let Some(limit) = filter.limit {
                query = query.limit(limit);
            }

            Ok(query.load::<(String, String)>(&mut conn)?)
        })
        .await
        .map_err(|e| EngineError::Database(format!("Blocking task failed: {}", e)))?
    }

    async fn update_fields(&self, venue: &VenueRecord) -> EngineResult<()> {
        Validator::validate_venue_name(&venue.name)?;
        if let Some(coords) = &venue.coordinates {
            Validator::validate_latitude(coords.latitude)?;
            Validator::validate_longitude(coords.longitude)?;
        }

        let db = Arc::clone(&self.db);
        let id = venue.id.clone();
        let changes = Self::entity_to_changeset(venue);

        task::spawn_blocking(move || -> EngineResult<()> {
            let mut conn = db.get_connection()?;
            let updated = diesel::update(venues::table.filter(venues::id.eq(&id)))
                .set(&changes)
                .execute(&mut conn)?;
            if updated == 0 {
                return Err(EngineError::NotFound(format!("Venue {} not found", id)));
            }
            Ok(())
        })
        .await
        .map_err(|e| EngineError::Database(format!("Blocking task failed: {}", e)))?
    }

    async fn upsert_images(&self, venue_id: &str, images: &[VenueImage]) -> EngineResult<usize> {
        if images.is_empty() {
            return Ok(0);
        }
        for image in images {
            Validator::validate_url(&image.url)?;
        }

        let db = Arc::clone(&self.db);
        let rows: Vec<NewVenueImageRow> = images
            .iter()
            .map(|i| NewVenueImageRow {
                venue_id: venue_id.to_string(),
                url: i.url.clone(),
                source_tier: i.source_tier,
                description: i.description.clone(),
                position: i.position,
            })
            .collect();

        task::spawn_blocking(move || -> EngineResult<usize> {
            let mut conn = db.get_connection()?;
            let n = diesel::insert_into(venue_images::table)
                .values(&rows)
                .on_conflict((venue_images::venue_id, venue_images::url))
                .do_update()
                .set((
                    venue_images::source_tier
                        .eq(diesel::upsert::excluded(venue_images::source_tier)),
                    venue_images::description
                        .eq(diesel::upsert::excluded(venue_images::description)),
                    venue_images::position.eq(diesel::upsert::excluded(venue_images::position)),
                ))
                .execute(&mut conn)?;
            Ok(n)
        })
        .await
        .map_err(|e| EngineError::Database(format!("Blocking task failed: {}", e)))?
    }

    async fn upsert_videos(&self, venue_id: &str, videos: &[VenueVideo]) -> EngineResult<usize> {
        if videos.is_empty() {
            return Ok(0);
        }
        for video in videos {
            Validator::validate_url(&video.url)?;
        }

        let db = Arc::clone(&self.db);
        let rows: Vec<NewVenueVideoRow> = videos
            .iter()
            .map(|v| NewVenueVideoRow {
                venue_id: venue_id.to_string(),
                url: v.url.clone(),
                title: v.title.clone(),
                position: v.position,
            })
            .collect();

        task::spawn_blocking(move || -> EngineResult<usize> {
            let mut conn = db.get_connection()?;
            let n = diesel::insert_into(venue_videos::table)
                .values(&rows)
                .on_conflict((venue_videos::venue_id, venue_videos::url))
                .do_update()
                .set((
                    venue_videos::title.eq(diesel::upsert::excluded(venue_videos::title)),
                    venue_videos::position.eq(diesel::upsert::excluded(venue_videos::position)),
                ))
                .execute(&mut conn)?;
            Ok(n)
        })
        .await
        .map_err(|e| EngineError::Database(format!("Blocking task failed: {}", e)))?
    }

    async fn delete_video(&self, venue_id: &str, url: &str) -> EngineResult<bool> {
        let db = Arc::clone(&self.db);
        let venue_id = venue_id.to_string();
        let url = url.to_string();

        task::spawn_blocking(move || -> EngineResult<bool> {
            let mut conn = db.get_connection()?;
            let n = diesel::delete(
                venue_videos::table
                    .filter(venue_videos::venue_id.eq(&venue_id))
                    .filter(venue_videos::url.eq(&url)),
            )
            .execute(&mut conn)?;
            Ok(n > 0)
        })
        .await
        .map_err(|e| EngineError::Database(format!("Blocking task failed: {}", e)))?
    }

    async fn upsert_type_links(
        &self,
        venue_id: &str,
        type_names: &[String],
    ) -> EngineResult<usize> {
        if type_names.is_empty() {
            return Ok(0);
        }

        let db = Arc::clone(&self.db);
        let venue_id = venue_id.to_string();
        let names: Vec<String> = type_names.to_vec();

        task::spawn_blocking(move || -> EngineResult<usize> {
            let mut conn = db.get_connection()?;

            conn.transaction::<usize, EngineError, _>(|conn| {
                // Step 1: make sure every classification exists
                let new_types: Vec<NewVenueTypeRow> = names
                    .iter()
                    .map(|name| NewVenueTypeRow {
                        id: Uuid::new_v4(),
                        name: name.clone(),
                    })
                    .collect();
                diesel::insert_into(venue_types::table)
                    .values(&new_types)
                    .on_conflict(venue_types::name)
                    .do_nothing()
                    .execute(conn)?;

                // Step 2: resolve name -> id
                let name_to_id: HashMap<String, Uuid> = venue_types::table
                    .filter(venue_types::name.eq_any(&names))
                    .select((venue_types::name, venue_types::id))
                    .load::<(String, Uuid)>(conn)?
                    .into_iter()
                    .collect();

                // Step 3: link, skipping links that already exist
                let links: Vec<NewVenueTypeLink> = names
                    .iter()
                    .filter_map(|name| name_to_id.get(name))
                    .map(|type_id| NewVenueTypeLink {
                        venue_id: venue_id.clone(),
                        type_id: *type_id,
                    })
                    .collect();
                let n = diesel::insert_into(venue_type_links::table)
                    .values(&links)
                    .on_conflict_do_nothing()
                    .execute(conn)?;

                Ok(n)
            })
        })
        .await
        .map_err(|e| EngineError::Database(format!("Blocking task failed: {}", e)))?
    }

    async fn upsert_setting_links(
        &self,
        venue_id: &str,
        settings: &[VenueSetting],
    ) -> EngineResult<usize> {
        if settings.is_empty() {
            return Ok(0);
        }

        let db = Arc::clone(&self.db);
        let rows: Vec<NewVenueSettingLink> = settings
            .iter()
            .map(|s| NewVenueSettingLink {
                venue_id: venue_id.to_string(),
                setting: *s,
            })
            .collect();

        task::spawn_blocking(move || -> EngineResult<usize> {
            let mut conn = db.get_connection()?;
            let n = diesel::insert_into(venue_setting_links::table)
                .values(&rows)
                .on_conflict_do_nothing()
                .execute(&mut conn)?;
            Ok(n)
        })
        .await
        .map_err(|e| EngineError::Database(format!("Blocking task failed: {}", e)))?
    }

    async fn upsert_provenance(
        &self,
        venue_id: &str,
        attr: &str,
        provenance: &AttributeProvenance,
    ) -> EngineResult<()> {
        let db = Arc::clone(&self.db);
        let row = NewProvenanceRow {
            venue_id: venue_id.to_string(),
            attribute: attr.to_string(),
            source_tier: provenance.source_tier,
            provider: provenance.provider.clone(),
            recorded_at: provenance.recorded_at,
        };

        task::spawn_blocking(move || -> EngineResult<()> {
            let mut conn = db.get_connection()?;
            diesel::insert_into(attribute_provenance::table)
                .values(&row)
                .on_conflict((
                    attribute_provenance::venue_id,
                    attribute_provenance::attribute,
                ))
                .do_update()
                .set((
                    attribute_provenance::source_tier
                        .eq(diesel::upsert::excluded(attribute_provenance::source_tier)),
                    attribute_provenance::provider
                        .eq(diesel::upsert::excluded(attribute_provenance::provider)),
                    attribute_provenance::recorded_at
                        .eq(diesel::upsert::excluded(attribute_provenance::recorded_at)),
                ))
                .execute(&mut conn)?;
            Ok(())
        })
        .await
        .map_err(|e| EngineError::Database(format!("Blocking task failed: {}", e)))?
    }

    async fn flag_for_review(
        &self,
        venue_id: &str,
        flag_kind: &str,
        detail: &str,
    ) -> EngineResult<()> {
        let db = Arc::clone(&self.db);
        let row = NewReviewFlagRow {
            venue_id: venue_id.to_string(),
            flag_kind: flag_kind.to_string(),
            detail: detail.to_string(),
        };

        task::spawn_blocking(move || -> EngineResult<()> {
            let mut conn = db.get_connection()?;
            diesel::insert_into(review_flags::table)
                .values(&row)
                .on_conflict((review_flags::venue_id, review_flags::flag_kind))
                .do_update()
                .set((
                    review_flags::detail.eq(diesel::upsert::excluded(review_flags::detail)),
                    review_flags::created_at.eq(Utc::now()),
                ))
                .execute(&mut conn)?;
            Ok(())
        })
        .await
        .map_err(|e| EngineError::Database(format!("Blocking task failed: {}", e)))?
    }

    async fn record_audit(&self, venue_id: &str, completeness: i32) -> EngineResult<()> {
        let db = Arc::clone(&self.db);
        let venue_id = venue_id.to_string();

        task::spawn_blocking(move || -> EngineResult<()> {
            let mut conn = db.get_connection()?;
            diesel::update(venues::table.filter(venues::id.eq(&venue_id)))
                .set((
                    venues::completeness.eq(completeness),
                    venues::last_audited_at.eq(Utc::now()),
                    venues::updated_at.eq(Utc::now()),
                ))
                .execute(&mut conn)?;
            Ok(())
        })
        .await
        .map_err(|e| EngineError::Database(format!("Blocking task failed: {}", e)))?
    }
}

/// Escape LIKE wildcards in a user-supplied prefix.
fn escape_like(prefix: &str) -> String {
    prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
