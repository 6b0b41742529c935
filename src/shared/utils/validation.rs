use crate::shared::errors::{EngineError, EngineResult};

pub struct Validator;

impl Validator {
    pub fn validate_venue_name(name: &str) -> EngineResult<()> {
        if name.trim().is_empty() {
            return Err(EngineError::Validation(
                "Venue name cannot be empty".to_string(),
            ));
        }
        if name.len() > 255 {
            return Err(EngineError::Validation(
                "Venue name too long (max 255 characters)".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_latitude(lat: f64) -> EngineResult<()> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(EngineError::Validation(
                "Latitude must be between -90 and 90".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_longitude(lon: f64) -> EngineResult<()> {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(EngineError::Validation(
                "Longitude must be between -180 and 180".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_url(url: &str) -> EngineResult<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(EngineError::Validation(format!(
                "URL must be absolute (http/https): {}",
                url
            )));
        }
        Ok(())
    }

    pub fn validate_slice(offset: i64, limit: Option<i64>) -> EngineResult<()> {
        if offset < 0 {
            return Err(EngineError::Validation(
                "Offset cannot be negative".to_string(),
            ));
        }
        if let Some(limit) = limit {
            if limit <= 0 {
                return Err(EngineError::Validation(
                    "Limit must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }
}
