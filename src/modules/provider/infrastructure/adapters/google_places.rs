use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;

use crate::log_debug;
use crate::modules::catalog::domain::Coordinates;
use crate::modules::provider::domain::{PlaceHit, PlaceSearchProvider};
use crate::modules::provider::infrastructure::http_client::{FetchClient, ProviderSpec};
use crate::shared::errors::{EngineError, EngineResult, ProviderError};

const BASE_URL: &str = "https://places.googleapis.com/v1";

/// Fields requested from the text-search endpoint. The API only returns
/// what the mask names, so this must list everything the mapper reads.
const FIELD_MASK: &str =
    "places.id,places.displayName,places.location,places.websiteUri,places.rating";

/// Place lookup against the Google Places text-search API.
pub struct GooglePlacesAdapter {
    http_client: FetchClient,
    base_url: String,
}

impl GooglePlacesAdapter {
    pub fn new(api_key: &str) -> EngineResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Goog-Api-Key",
            HeaderValue::from_str(api_key)
                .map_err(|_| EngineError::Configuration("Places API key is not a valid header value".to_string()))?,
        );
        headers.insert("X-Goog-FieldMask", HeaderValue::from_static(FIELD_MASK));

        Ok(Self {
            http_client: FetchClient::with_headers(ProviderSpec::places(), headers)?,
            base_url: BASE_URL.to_string(),
        })
    }
}

#[async_trait]
impl PlaceSearchProvider for GooglePlacesAdapter {
    async fn search_place(&self, query: &str) -> Result<Option<PlaceHit>, ProviderError> {
        let url = format!("{}/places:searchText", self.base_url);
        let body = serde_json::json!({
            "textQuery": query,
            "maxResultCount": 1,
        });

        log_debug!("places: searching '{}'", query);

        let response: SearchTextResponse = self.http_client.post_json(&url, &body).await?;

        let Some(place) = response.places.unwrap_or_default().into_iter().next() else {
            log_debug!("places: no candidates for '{}'", query);
            return Ok(None);
        };

        // A hit is only usable with an id and a point on the map.
        let (Some(place_id), Some(location)) = (place.id, place.location) else {
            log_debug!("places: candidate for '{}' missing id or location", query);
            return Ok(None);
        };
        let (Some(latitude), Some(longitude)) = (location.latitude, location.longitude) else {
            return Ok(None);
        };

        let coordinates = Coordinates::new(latitude, longitude);
        if !coordinates.is_valid() {
            log_debug!("places: candidate for '{}' outside WGS84 range", query);
            return Ok(None);
        }

        Ok(Some(PlaceHit {
            place_id,
            name: place
                .display_name
                .and_then(|text| text.text)
                .unwrap_or_else(|| query.to_string()),
            coordinates,
            website: place.website_uri,
            rating: place.rating,
        }))
    }
}

#[derive(Deserialize)]
struct SearchTextResponse {
    places: Option<Vec<ResponsePlace>>,
}

#[derive(Deserialize)]
struct ResponsePlace {
    id: Option<String>,
    #[serde(rename = "displayName")]
    display_name: Option<ResponseText>,
    location: Option<ResponseLocation>,
    #[serde(rename = "websiteUri")]
    website_uri: Option<String>,
    rating: Option<f32>,
}

#[derive(Deserialize)]
struct ResponseText {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ResponseLocation {
    latitude: Option<f64>,
    longitude: Option<f64>,
}
