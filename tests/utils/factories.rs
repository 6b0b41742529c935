/// Test data factories using builder pattern
///
/// Provides convenient methods to create venue records with sensible defaults
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;
use verity_lib::modules::catalog::domain::{
    attribute, AttributeProvenance, CapacityRange, Coordinates, PriceRange, PriceUnit,
    SourceTier, VenueImage, VenueRecord, VenueSetting, VenueVideo,
};

pub struct VenueFactory {
    id: String,
    name: String,
    region: Option<String>,
    country: Option<String>,
    subregion: Option<String>,
    address: Option<String>,
    description: Option<String>,
    website: Option<String>,
    phone: Option<String>,
    coordinates: Option<Coordinates>,
    capacity: CapacityRange,
    price: PriceRange,
    rating: Option<f32>,
    review_count: Option<i32>,
    venue_types: Vec<String>,
    settings: Vec<VenueSetting>,
    images: Vec<VenueImage>,
    videos: Vec<VenueVideo>,
    provenance: HashMap<String, AttributeProvenance>,
}

impl Default for VenueFactory {
    fn default() -> Self {
        Self {
            id: format!("venue-{}", Uuid::new_v4()),
            name: "Test Venue".to_string(),
            region: None,
            country: None,
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
            venue_types: Vec::new(),
            settings: Vec::new(),
            images: Vec::new(),
            videos: Vec::new(),
            provenance: HashMap::new(),
        }
    }
}

impl VenueFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bare record: only an id and a name.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// A record that passes every audit check.
    pub fn complete() -> Self {
        Self::default()
            .with_name("The Mountain Terrace")
            .with_region("Woodside")
            .with_country("United States")
            .with_subregion("San Mateo County")
            .with_address("19345 Skyline Blvd, Woodside, CA")
            .with_description(
                "A redwood-framed event space on Skyline Boulevard with sweeping bay views.",
            )
            .with_website("https://themountainterrace.com")
            .with_phone("+1 650 555 0100")
            .with_coordinates(37.4214, -122.2573)
            .with_capacity(20, 150)
            .with_price(4000, 12000)
            .with_rating(4.7)
            .with_review_count(112)
            .with_types(&["garden"])
            .with_settings(&[VenueSetting::Outdoor])
            .with_image("https://cdn.example/0.jpg", SourceTier::Official)
            .with_image("https://cdn.example/1.jpg", SourceTier::Official)
            .with_image("https://cdn.example/2.jpg", SourceTier::Curated)
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
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

    pub fn with_subregion(mut self, subregion: &str) -> Self {
        self.subregion = Some(subregion.to_string());
        self
    }

    pub fn with_address(mut self, address: &str) -> Self {
        self.address = Some(address.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_website(mut self, website: &str) -> Self {
        self.website = Some(website.to_string());
        self
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = Some(phone.to_string());
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.coordinates = Some(Coordinates::new(latitude, longitude));
        self
    }

    pub fn with_capacity(mut self, min: i32, max: i32) -> Self {
        self.capacity = CapacityRange {
            min: Some(min),
            max: Some(max),
        };
        self
    }

    pub fn with_price(mut self, min: i32, max: i32) -> Self {
        self.price = PriceRange {
            min: Some(min),
            max: Some(max),
            unit: None,
        };
        self
    }

    pub fn with_price_unit(mut self, unit: PriceUnit) -> Self {
        self.price.unit = Some(unit);
        self
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_review_count(mut self, review_count: i32) -> Self {
        self.review_count = Some(review_count);
        self
    }

    pub fn with_types(mut self, types: &[&str]) -> Self {
        self.venue_types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_settings(mut self, settings: &[VenueSetting]) -> Self {
        self.settings = settings.to_vec();
        self
    }

    pub fn with_image(mut self, url: &str, tier: SourceTier) -> Self {
        let position = self.images.len() as i32;
        self.images.push(VenueImage::new(url.to_string(), tier, position));
        self
    }

    pub fn with_video(mut self, url: &str, title: &str) -> Self {
        let position = self.videos.len() as i32;
        self.videos.push(VenueVideo {
            url: url.to_string(),
            title: title.to_string(),
            position,
        });
        self
    }

    pub fn with_provenance(mut self, attr: &str, tier: SourceTier, provider: &str) -> Self {
        self.provenance
            .insert(attr.to_string(), AttributeProvenance::new(tier, provider));
        self
    }

    /// Marks the website as authoritative data that must never be overwritten.
    pub fn with_authoritative_website(self, website: &str) -> Self {
        self.with_website(website).with_provenance(
            attribute::WEBSITE,
            SourceTier::Authoritative,
            "places",
        )
    }

    pub fn build(self) -> VenueRecord {
        let now = Utc::now();
        VenueRecord {
            id: self.id,
            name: self.name,
            region: self.region,
            country: self.country,
            subregion: self.subregion,
            address: self.address,
            description: self.description,
            website: self.website,
            phone: self.phone,
            coordinates: self.coordinates,
            capacity: self.capacity,
            price: self.price,
            rating: self.rating,
            review_count: self.review_count,
            completeness: None,
            venue_types: self.venue_types,
            settings: self.settings,
            images: self.images,
            videos: self.videos,
            provenance: self.provenance,
            created_at: now,
            updated_at: now,
            last_audited_at: None,
        }
    }
}
