use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{validate_coordinates, Position, Restaurant};
use crate::providers::{coerce_f64, PlaceQuery, PlaceRow, PlacesProvider, ProviderError};

/// Restaurant search around a resolved position.
#[derive(Clone)]
pub struct PlacesSearch {
    provider: Arc<dyn PlacesProvider>,
    radius_m: u32,
}

impl PlacesSearch {
    pub fn new(provider: Arc<dyn PlacesProvider>, radius_m: u32) -> Self {
        Self { provider, radius_m }
    }

    /// Search for `phrase` around `position`, nearest first.
    ///
    /// Coordinates are validated before any outbound call. Malformed rows
    /// are logged and dropped; an empty remainder yields
    /// [`Error::NoResults`].
    pub async fn search(&self, position: &Position, phrase: &str) -> Result<Vec<Restaurant>> {
        validate_coordinates(position.latitude, position.longitude)?;

        let query = PlaceQuery {
            phrase: phrase.to_string(),
            latitude: position.latitude,
            longitude: position.longitude,
            radius_m: self.radius_m,
        };
        let rows = self
            .provider
            .keyword_search(&query)
            .await
            .map_err(search_error)?;
        let received = rows.len();

        let mut seen = HashSet::new();
        let restaurants: Vec<Restaurant> = rows
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| match validate_row(row) {
                Ok(restaurant) => Some(restaurant),
                Err(reason) => {
                    warn!(index, %reason, "dropping malformed place row");
                    None
                }
            })
            .filter(|r| seen.insert((r.name.clone(), r.address.clone())))
            .collect();

        debug!(phrase, received, kept = restaurants.len(), "places search finished");
        if restaurants.is_empty() {
            return Err(Error::no_results(phrase));
        }
        Ok(restaurants)
    }
}

/// Why a provider row was dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum RowRejection {
    MissingField(&'static str),
    BadDistance(String),
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowRejection::MissingField(field) => write!(f, "missing {}", field),
            RowRejection::BadDistance(raw) => write!(f, "unusable distance {}", raw),
        }
    }
}

/// Turn a raw provider row into a [`Restaurant`].
pub fn validate_row(row: PlaceRow) -> std::result::Result<Restaurant, RowRejection> {
    let name = required(row.name, "name")?;
    let address = required(row.address, "address")?;
    let category = required(row.category, "category")?;

    let distance = match row.distance.as_ref() {
        None => return Err(RowRejection::MissingField("distance")),
        Some(raw) => coerce_f64(raw)
            .filter(|d| d.is_finite() && *d >= 0.0)
            .ok_or_else(|| RowRejection::BadDistance(raw.to_string()))?,
    };

    let rating = row
        .rating
        .as_ref()
        .and_then(coerce_f64)
        .filter(|r| r.is_finite());

    Ok(Restaurant {
        name,
        address,
        category,
        distance,
        rating,
    })
}

fn required(
    value: Option<String>,
    field: &'static str,
) -> std::result::Result<String, RowRejection> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(RowRejection::MissingField(field))
}

fn search_error(err: ProviderError) -> Error {
    match err {
        ProviderError::Timeout { service } => Error::UpstreamTimeout {
            service: service.to_string(),
        },
        ProviderError::MissingKey { variable, .. } => Error::ConfigurationMissing {
            name: variable.to_string(),
        },
        other => Error::SearchFailed {
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::keywords::DEFAULT_FOOD_PHRASE;
    use crate::test_helpers::{place_row, FakePlaces};
    use serde_json::json;

    fn seoul() -> Position {
        Position::new(37.5665, 126.978, "Seoul", "South Korea").unwrap()
    }

    #[test]
    fn rating_is_optional_and_coerced() {
        let mut row = place_row("A", "addr", "cat", "10");
        row.rating = Some(json!("4.3"));
        assert_eq!(validate_row(row.clone()).unwrap().rating, Some(4.3));

        row.rating = Some(json!("great"));
        assert_eq!(validate_row(row.clone()).unwrap().rating, None);

        row.rating = None;
        assert_eq!(validate_row(row).unwrap().rating, None);
    }

    #[test]
    fn rows_need_name_address_category_and_distance() {
        let mut row = place_row("A", "addr", "cat", "10");
        row.name = Some("  ".into());
        assert_eq!(validate_row(row).unwrap_err(), RowRejection::MissingField("name"));

        let row = place_row("A", "addr", "cat", "far");
        assert!(matches!(validate_row(row), Err(RowRejection::BadDistance(_))));

        let row = place_row("A", "addr", "cat", "-5");
        assert!(matches!(validate_row(row), Err(RowRejection::BadDistance(_))));

        let mut row = place_row("A", "addr", "cat", "10");
        row.distance = None;
        assert_eq!(validate_row(row).unwrap_err(), RowRejection::MissingField("distance"));
    }

    #[tokio::test]
    async fn invalid_coordinates_make_no_outbound_call() {
        let provider = FakePlaces::with_rows(vec![place_row("A", "addr", "cat", "1")]);
        let search = PlacesSearch::new(Arc::new(provider.clone()), 1000);
        let bad = Position {
            latitude: 95.0,
            longitude: 0.0,
            city: String::new(),
            country: String::new(),
        };

        let err = search.search(&bad, "피자 맛집").await.unwrap_err();

        assert_eq!(err.kind(), FailureKind::InvalidCoordinates);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn query_carries_phrase_radius_and_position() {
        let provider = FakePlaces::with_rows(vec![place_row("A", "addr", "cat", "1")]);
        let search = PlacesSearch::new(Arc::new(provider.clone()), 750);

        search.search(&seoul(), "Korean food restaurant").await.unwrap();

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].phrase, "Korean food restaurant");
        assert_eq!(calls[0].radius_m, 750);
        assert_eq!(calls[0].latitude, 37.5665);
    }

    #[tokio::test]
    async fn malformed_rows_are_dropped_in_order() {
        let provider = FakePlaces::with_rows(vec![
            place_row("First", "a1", "c", "5"),
            place_row("Broken", "a2", "c", "unknown"),
            place_row("Second", "a3", "c", "12.5"),
        ]);
        let search = PlacesSearch::new(Arc::new(provider), 1000);

        let found = search.search(&seoul(), "맛집").await.unwrap();
        let names: Vec<_> = found.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert_eq!(found[1].distance, 12.5);
    }

    #[tokio::test]
    async fn duplicate_rows_are_collapsed() {
        let provider = FakePlaces::with_rows(vec![
            place_row("Same", "addr", "c", "5"),
            place_row("Same", "addr", "c", "6"),
        ]);
        let search = PlacesSearch::new(Arc::new(provider), 1000);

        let found = search.search(&seoul(), "맛집").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].distance, 5.0);
    }

    #[tokio::test]
    async fn only_malformed_row_yields_no_results() {
        let provider = FakePlaces::with_rows(vec![place_row("Lonely", "a", "c", "")]);
        let search = PlacesSearch::new(Arc::new(provider), 1000);

        let err = search.search(&seoul(), DEFAULT_FOOD_PHRASE).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::NoResults);
        assert!(err.to_string().contains("more specific"));
    }

    #[tokio::test]
    async fn provider_failures_map_to_domain_errors() {
        let cases = [
            (ProviderError::Timeout { service: "kakao" }, FailureKind::UpstreamTimeout),
            (
                ProviderError::MissingKey {
                    service: "kakao",
                    variable: "KAKAO_API_KEY",
                },
                FailureKind::ConfigurationMissing,
            ),
            (
                ProviderError::Transport {
                    service: "kakao",
                    message: "connection reset".into(),
                },
                FailureKind::SearchFailed,
            ),
            (
                ProviderError::Contract {
                    service: "kakao",
                    message: "missing field `documents`".into(),
                },
                FailureKind::SearchFailed,
            ),
        ];

        for (provider_error, kind) in cases {
            let search = PlacesSearch::new(Arc::new(FakePlaces::failing(provider_error)), 1000);
            let err = search.search(&seoul(), "맛집").await.unwrap_err();
            assert_eq!(err.kind(), kind);
        }
    }
}
