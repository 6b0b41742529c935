use crate::modules::catalog::domain::value_objects::{PriceUnit, SourceTier, VenueSetting};
use crate::schema::{
    attribute_provenance, review_flags, venue_images, venue_setting_links, venue_type_links,
    venue_types, venue_videos, venues,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ================== VENUE MODELS ==================

/// Main venue database model
#[derive(Queryable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = venues)]
pub struct VenueRow {
    pub id: String,
    pub name: String,
    pub region: Option<String>,
    pub country: Option<String>,
    pub subregion: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub capacity_min: Option<i32>,
    pub capacity_max: Option<i32>,
    pub price_min: Option<i32>,
    pub price_max: Option<i32>,
    pub price_unit: Option<PriceUnit>,
    pub rating: Option<f32>,
    pub review_count: Option<i32>,
    pub completeness: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_audited_at: Option<DateTime<Utc>>, // Must be last to match schema
}

/// Update payload (write) — excludes `id` and `created_at`. Optional fields
/// set to `None` are skipped by Diesel, so absent data never nulls a column.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = venues)]
pub struct VenueChangeset {
    pub name: String,
    pub region: Option<String>,
    pub country: Option<String>,
    pub subregion: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub capacity_min: Option<i32>,
    pub capacity_max: Option<i32>,
    pub price_min: Option<i32>,
    pub price_max: Option<i32>,
    pub price_unit: Option<PriceUnit>,
    pub rating: Option<f32>,
    pub review_count: Option<i32>,
    pub completeness: Option<i32>,
    pub updated_at: DateTime<Utc>,
    pub last_audited_at: Option<DateTime<Utc>>,
}

// ================== MEDIA MODELS ==================

#[derive(Queryable, Identifiable, Associations, Debug, Clone)]
#[diesel(belongs_to(VenueRow, foreign_key = venue_id))]
#[diesel(table_name = venue_images)]
#[diesel(primary_key(venue_id, url))]
pub struct VenueImageRow {
    pub venue_id: String,
    pub url: String,
    pub source_tier: SourceTier,
    pub description: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = venue_images)]
pub struct NewVenueImageRow {
    pub venue_id: String,
    pub url: String,
    pub source_tier: SourceTier,
    pub description: Option<String>,
    pub position: i32,
}

#[derive(Queryable, Identifiable, Associations, Debug, Clone)]
#[diesel(belongs_to(VenueRow, foreign_key = venue_id))]
#[diesel(table_name = venue_videos)]
#[diesel(primary_key(venue_id, url))]
pub struct VenueVideoRow {
    pub venue_id: String,
    pub url: String,
    pub title: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = venue_videos)]
pub struct NewVenueVideoRow {
    pub venue_id: String,
    pub url: String,
    pub title: String,
    pub position: i32,
}

// ================== CLASSIFICATION MODELS ==================

#[derive(Queryable, Identifiable, Debug, Clone)]
#[diesel(table_name = venue_types)]
pub struct VenueTypeRow {
    pub id: Uuid,
    pub name: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = venue_types)]
pub struct NewVenueTypeRow {
    pub id: Uuid,
    pub name: String,
}

// ============= VENUE-TYPE ASSOCIATION (join) =============

#[derive(Queryable, Identifiable, Associations, Debug, Clone)]
#[diesel(belongs_to(VenueRow, foreign_key = venue_id))]
#[diesel(belongs_to(VenueTypeRow, foreign_key = type_id))]
#[diesel(table_name = venue_type_links)]
#[diesel(primary_key(venue_id, type_id))]
pub struct VenueTypeLink {
    pub venue_id: String,
    pub type_id: Uuid,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = venue_type_links)]
pub struct NewVenueTypeLink {
    pub venue_id: String,
    pub type_id: Uuid,
}

// ================== SETTING MODELS ==================

#[derive(Queryable, Identifiable, Associations, Debug, Clone)]
#[diesel(belongs_to(VenueRow, foreign_key = venue_id))]
#[diesel(table_name = venue_setting_links)]
#[diesel(primary_key(venue_id, setting))]
pub struct VenueSettingLink {
    pub venue_id: String,
    pub setting: VenueSetting,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = venue_setting_links)]
pub struct NewVenueSettingLink {
    pub venue_id: String,
    pub setting: VenueSetting,
}

// ================== PROVENANCE MODELS ==================

#[derive(Queryable, Identifiable, Associations, Debug, Clone)]
#[diesel(belongs_to(VenueRow, foreign_key = venue_id))]
#[diesel(table_name = attribute_provenance)]
#[diesel(primary_key(venue_id, attribute))]
pub struct ProvenanceRow {
    pub venue_id: String,
    pub attribute: String,
    pub source_tier: SourceTier,
    pub provider: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = attribute_provenance)]
pub struct NewProvenanceRow {
    pub venue_id: String,
    pub attribute: String,
    pub source_tier: SourceTier,
    pub provider: String,
    pub recorded_at: DateTime<Utc>,
}

// ================== REVIEW FLAG MODELS ==================

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = review_flags)]
pub struct NewReviewFlagRow {
    pub venue_id: String,
    pub flag_kind: String,
    pub detail: String,
}
