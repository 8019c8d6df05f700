//! In-memory provider fakes shared by unit tests, integration tests and the
//! service crates (through the `test-utils` feature).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::finder::{FinderOptions, RestaurantFinder};
use crate::intent::QueryInterpreter;
use crate::location::LocationResolver;
use crate::places::PlacesSearch;
use crate::providers::{
    GeocodedPlace, Geocoder, IpLocation, IpLocator, PlaceQuery, PlaceRow, PlacesProvider,
    ProviderError,
};

/// Build a raw provider row with a string distance and no rating.
pub fn place_row(name: &str, address: &str, category: &str, distance: &str) -> PlaceRow {
    PlaceRow {
        name: Some(name.to_string()),
        address: Some(address.to_string()),
        category: Some(category.to_string()),
        distance: Some(json!(distance)),
        rating: None,
    }
}

/// Three well-formed rows, nearest first.
pub fn sample_rows() -> Vec<PlaceRow> {
    let mut rows = vec![
        place_row("진미식당", "서울 마포구 공덕동 105-127", "음식점 > 한식", "87"),
        place_row("Pizza Hall", "서울 마포구 도화동 1", "음식점 > 양식 > 피자", "240"),
        place_row("Sushi Bar", "서울 마포구 아현동 3", "음식점 > 일식 > 초밥", "512"),
    ];
    rows[1].rating = Some(json!(4.6));
    rows[2].rating = Some(json!("4.1"));
    rows
}

/// Geocoder that returns fixed coordinates and records looked-up names.
#[derive(Clone)]
pub struct FakeGeocoder {
    outcome: Result<Vec<(f64, f64)>, ProviderError>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeGeocoder {
    pub fn with_places(places: Vec<(f64, f64)>) -> Self {
        Self {
            outcome: Ok(places),
            calls: Arc::default(),
        }
    }

    pub fn failing(err: ProviderError) -> Self {
        Self {
            outcome: Err(err),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, name: &str) -> Result<Vec<GeocodedPlace>, ProviderError> {
        self.calls.lock().unwrap().push(name.to_string());
        self.outcome.clone().map(|places| {
            places
                .into_iter()
                .map(|(latitude, longitude)| GeocodedPlace {
                    name: name.to_string(),
                    latitude,
                    longitude,
                })
                .collect()
        })
    }
}

/// IP locator with a fixed answer that records the IPs it was asked about.
#[derive(Clone)]
pub struct FakeIpLocator {
    name: &'static str,
    outcome: Result<IpLocation, ProviderError>,
    calls: Arc<Mutex<Vec<Option<String>>>>,
}

impl FakeIpLocator {
    pub fn at(name: &'static str, latitude: f64, longitude: f64) -> Self {
        Self {
            name,
            outcome: Ok(IpLocation {
                latitude,
                longitude,
                city: "Seoul".into(),
                country: "South Korea".into(),
            }),
            calls: Arc::default(),
        }
    }

    pub fn seoul(name: &'static str) -> Self {
        Self::at(name, 37.5665, 126.978)
    }

    pub fn failing(name: &'static str, err: ProviderError) -> Self {
        Self {
            name,
            outcome: Err(err),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<Option<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IpLocator for FakeIpLocator {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn locate(&self, ip: Option<&str>) -> Result<IpLocation, ProviderError> {
        self.calls.lock().unwrap().push(ip.map(str::to_string));
        self.outcome.clone()
    }
}

/// Places provider returning fixed rows and recording each query.
#[derive(Clone)]
pub struct FakePlaces {
    outcome: Result<Vec<PlaceRow>, ProviderError>,
    calls: Arc<Mutex<Vec<PlaceQuery>>>,
}

impl FakePlaces {
    pub fn with_rows(rows: Vec<PlaceRow>) -> Self {
        Self {
            outcome: Ok(rows),
            calls: Arc::default(),
        }
    }

    pub fn failing(err: ProviderError) -> Self {
        Self {
            outcome: Err(err),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<PlaceQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlacesProvider for FakePlaces {
    async fn keyword_search(&self, query: &PlaceQuery) -> Result<Vec<PlaceRow>, ProviderError> {
        self.calls.lock().unwrap().push(query.clone());
        self.outcome.clone()
    }
}

/// A full set of fakes wired into a [`RestaurantFinder`].
#[derive(Clone)]
pub struct FakeProviders {
    pub geocoder: FakeGeocoder,
    pub primary: FakeIpLocator,
    pub secondary: FakeIpLocator,
    pub places: FakePlaces,
}

impl FakeProviders {
    /// Geocoder answering Gangnam Station, both IP providers answering Seoul.
    pub fn new(places: FakePlaces) -> Self {
        Self {
            geocoder: FakeGeocoder::with_places(vec![(37.4979, 127.0276)]),
            primary: FakeIpLocator::seoul("primary"),
            secondary: FakeIpLocator::seoul("secondary"),
            places,
        }
    }

    pub fn with_sample_rows() -> Self {
        Self::new(FakePlaces::with_rows(sample_rows()))
    }

    /// Finder over these fakes with no streaming delay.
    pub fn finder(&self) -> RestaurantFinder {
        self.finder_with_delay(Duration::ZERO)
    }

    pub fn finder_with_delay(&self, event_delay: Duration) -> RestaurantFinder {
        let resolver = LocationResolver::new(
            Arc::new(self.geocoder.clone()),
            Arc::new(self.primary.clone()),
            Arc::new(self.secondary.clone()),
            "South Korea",
        );
        let places = PlacesSearch::new(Arc::new(self.places.clone()), 1000);
        RestaurantFinder::new(
            QueryInterpreter::default(),
            resolver,
            places,
            FinderOptions {
                event_delay,
                ..FinderOptions::default()
            },
        )
    }
}
