use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::modules::catalog::domain::value_objects::{
    CapacityRange, Coordinates, PriceRange, SourceTier, VenueSetting,
};

/// Well-known attribute keys for the provenance map.
///
/// These match the `attribute` column of the provenance table; images and
/// videos carry their tier inline instead.
pub mod attribute {
    pub const COORDINATES: &str = "coordinates";
    pub const WEBSITE: &str = "website";
    pub const DESCRIPTION: &str = "description";
    pub const PHONE: &str = "phone";
    pub const RATING: &str = "rating";
    pub const VIDEOS: &str = "videos";
}

/// Where an attribute value came from and how much we trust it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeProvenance {
    pub source_tier: SourceTier,
    pub provider: String,
    pub recorded_at: DateTime<Utc>,
}

impl AttributeProvenance {
    pub fn new(source_tier: SourceTier, provider: &str) -> Self {
        Self {
            source_tier,
            provider: provider.to_string(),
            recorded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueImage {
    pub url: String,
    pub source_tier: SourceTier,
    pub description: Option<String>,
    pub position: i32,
}

impl VenueImage {
    pub fn new(url: String, source_tier: SourceTier, position: i32) -> Self {
        Self {
            url,
            source_tier,
            description: None,
            position,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueVideo {
    pub url: String,
    pub title: String,
    pub position: i32,
}

/// The full venue aggregate: scalar columns plus media, classification
/// links, settings, and per-attribute provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueRecord {
    pub id: String,
    pub name: String,
    pub region: Option<String>,
    pub country: Option<String>,
    pub subregion: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub capacity: CapacityRange,
    pub price: PriceRange,
    pub rating: Option<f32>,
    pub review_count: Option<i32>,
    pub completeness: Option<i32>,
    pub venue_types: Vec<String>,
    pub settings: Vec<VenueSetting>,
    pub images: Vec<VenueImage>,
    pub videos: Vec<VenueVideo>,
    pub provenance: HashMap<String, AttributeProvenance>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_audited_at: Option<DateTime<Utc>>,
}

impl VenueRecord {
    /// Images that count toward the enrichment target. Stock placeholders
    /// are excluded on purpose.
    pub fn countable_image_count(&self) -> usize {
        self.images
            .iter()
            .filter(|i| !i.source_tier.is_placeholder())
            .count()
    }

    pub fn has_image_url(&self, url: &str) -> bool {
        self.images.iter().any(|i| i.url == url)
    }

    pub fn has_video_url(&self, url: &str) -> bool {
        self.videos.iter().any(|v| v.url == url)
    }

    /// Recorded trust tier for a scalar attribute, if any run has written it.
    pub fn attribute_tier(&self, attr: &str) -> Option<SourceTier> {
        self.provenance.get(attr).map(|p| p.source_tier)
    }

    /// Human-readable location used when building provider queries, e.g.
    /// "Sonoma, United States". Falls back to whatever parts exist.
    pub fn display_location(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(region) = self.region.as_deref() {
            if !region.is_empty() {
                parts.push(region);
            }
        }
        if let Some(country) = self.country.as_deref() {
            if !country.is_empty() {
                parts.push(country);
            }
        }
        parts.join(", ")
    }

    /// Next free position for an appended image.
    pub fn next_image_position(&self) -> i32 {
        self.images.iter().map(|i| i.position + 1).max().unwrap_or(0)
    }

    pub fn next_video_position(&self) -> i32 {
        self.videos.iter().map(|v| v.position + 1).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bare_record() -> VenueRecord {
        VenueRecord {
            id: "venue-1".to_string(),
            name: "The Mountain Terrace".to_string(),
            region: Some("Woodside".to_string()),
            country: Some("United States".to_string()),
            subregion: None,
            address: None,
            description: None,
            website: None,
            phone: None,
            coordinates: None,
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

    #[test]
    fn stock_images_do_not_count_toward_sufficiency() {
        let mut record = bare_record();
        record.images = vec![
            VenueImage::new("https://cdn.example/stock.jpg".into(), SourceTier::Stock, 0),
            VenueImage::new("https://cdn.example/real.jpg".into(), SourceTier::Official, 1),
        ];
        assert_eq!(record.countable_image_count(), 1);
        assert_eq!(record.images.len(), 2);
    }

    #[test]
    fn display_location_skips_missing_parts() {
        let mut record = bare_record();
        assert_eq!(record.display_location(), "Woodside, United States");
        record.country = None;
        assert_eq!(record.display_location(), "Woodside");
        record.region = None;
        assert_eq!(record.display_location(), "");
    }

    #[test]
    fn image_positions_append_after_existing() {
        let mut record = bare_record();
        assert_eq!(record.next_image_position(), 0);
        record.images.push(VenueImage::new(
            "https://cdn.example/a.jpg".into(),
            SourceTier::General,
            4,
        ));
        assert_eq!(record.next_image_position(), 5);
    }
}
