use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::keywords::DEFAULT_FOOD_PHRASE;

const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Check latitude/longitude against their legal ranges.
///
/// NaN values are rejected as well.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if LATITUDE_RANGE.contains(&latitude) && LONGITUDE_RANGE.contains(&longitude) {
        Ok(())
    } else {
        Err(Error::InvalidCoordinates {
            latitude,
            longitude,
        })
    }
}

/// Resolved geographic point with descriptive city/country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub country: String,
}

impl Position {
    /// Build a position, rejecting out-of-range coordinates.
    pub fn new(
        latitude: f64,
        longitude: f64,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Result<Self> {
        validate_coordinates(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
            city: city.into(),
            country: country.into(),
        })
    }
}

/// Caller-supplied coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One restaurant row returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub name: String,
    pub address: String,
    pub category: String,
    /// Distance from the search position in metres.
    pub distance: f64,
    pub rating: Option<f64>,
}

/// Parsed user intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIntent {
    pub location_name: Option<String>,
    pub food_phrase: String,
    pub use_current_location: bool,
}

impl SearchIntent {
    /// Whether the food phrase is the generic default.
    pub fn has_default_phrase(&self) -> bool {
        self.food_phrase == DEFAULT_FOOD_PHRASE
    }
}

impl Default for SearchIntent {
    fn default() -> Self {
        Self {
            location_name: None,
            food_phrase: DEFAULT_FOOD_PHRASE.to_string(),
            use_current_location: false,
        }
    }
}

/// Aggregate returned to callers of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub position: Position,
    pub restaurants: Vec<Restaurant>,
    pub effective_query: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_accepts_boundaries() {
        assert!(Position::new(90.0, 180.0, "a", "b").is_ok());
        assert!(Position::new(-90.0, -180.0, "a", "b").is_ok());
    }

    #[test]
    fn position_rejects_out_of_range() {
        for (lat, lon) in [(90.1, 0.0), (-91.0, 0.0), (0.0, 180.5), (0.0, -181.0), (f64::NAN, 0.0)] {
            let err = Position::new(lat, lon, "", "").unwrap_err();
            assert!(matches!(err, Error::InvalidCoordinates { .. }), "{lat},{lon}");
        }
    }

    #[test]
    fn default_intent_uses_generic_phrase() {
        let intent = SearchIntent::default();
        assert!(intent.has_default_phrase());
        assert!(intent.location_name.is_none());
        assert!(!intent.use_current_location);
    }

    #[test]
    fn restaurant_serializes_missing_rating_as_null() {
        let restaurant = Restaurant {
            name: "Jin".into(),
            address: "1 Main".into(),
            category: "음식점 > 한식".into(),
            distance: 120.0,
            rating: None,
        };
        let json = serde_json::to_value(&restaurant).unwrap();
        assert!(json["rating"].is_null());
        assert_eq!(json["distance"], 120.0);
    }
}
