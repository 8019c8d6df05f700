//! Request orchestration shared by every surface.
//!
//! [`RestaurantFinder`] runs interpret → resolve → search for one request.
//! The JSON endpoint and the MCP tools call [`RestaurantFinder::search`]; the
//! SSE endpoint consumes [`RestaurantFinder::stream`]. Requests share no
//! mutable state.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures::stream::BoxStream;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::FinderConfig;
use crate::error::{Error, FailureKind, Result};
use crate::http::HttpClient;
use crate::intent::QueryInterpreter;
use crate::location::LocationResolver;
use crate::model::{Coordinates, Position, Restaurant, SearchIntent, SearchResult};
use crate::places::PlacesSearch;
use crate::providers::{Ip2LocationClient, IpApiClient, KakaoClient};
use crate::recommend::pick_random_restaurant;

/// Message carried by the terminal `complete` event.
pub const STREAM_COMPLETE_MESSAGE: &str = "Streaming complete.";

/// One search request, independent of the surface it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub context: Option<String>,
    /// Explicit coordinates bypass named and IP resolution.
    pub coordinates: Option<Coordinates>,
    /// Caller address used for IP geolocation.
    pub client_ip: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    pub fn with_coordinates(mut self, coordinates: Option<Coordinates>) -> Self {
        self.coordinates = coordinates;
        self
    }

    pub fn with_client_ip(mut self, client_ip: Option<String>) -> Self {
        self.client_ip = client_ip;
        self
    }
}

/// Tunables that do not affect provider calls.
#[derive(Debug, Clone, PartialEq)]
pub struct FinderOptions {
    /// Pause after each streamed restaurant.
    pub event_delay: Duration,
    pub rating_thresholds: Vec<f64>,
}

impl Default for FinderOptions {
    fn default() -> Self {
        Self {
            event_delay: crate::config::DEFAULT_STREAM_DELAY,
            rating_thresholds: crate::config::DEFAULT_RATING_THRESHOLDS.to_vec(),
        }
    }
}

/// Event emitted by the streaming variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchEvent {
    Location { data: Position },
    Restaurant { data: Restaurant },
    Complete { message: String, count: usize },
    Error {
        message: String,
        kind: FailureKind,
        status: u16,
    },
}

impl SearchEvent {
    pub fn failure(err: &Error) -> Self {
        SearchEvent::Error {
            message: err.to_string(),
            kind: err.kind(),
            status: err.status_code(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchEvent::Complete { .. } | SearchEvent::Error { .. })
    }
}

/// Progress of one streamed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStage {
    Start,
    LocationResolved,
    Searching,
    Emitting(usize),
    Complete,
    Failed,
}

impl fmt::Display for StreamStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamStage::Start => write!(f, "start"),
            StreamStage::LocationResolved => write!(f, "location_resolved"),
            StreamStage::Searching => write!(f, "searching"),
            StreamStage::Emitting(i) => write!(f, "emitting({})", i),
            StreamStage::Complete => write!(f, "complete"),
            StreamStage::Failed => write!(f, "failed"),
        }
    }
}

struct FinderInner {
    interpreter: QueryInterpreter,
    resolver: LocationResolver,
    places: PlacesSearch,
    options: FinderOptions,
}

/// Orchestrates interpretation, location resolution and places search.
///
/// Cloning is cheap; clones share the same provider clients.
#[derive(Clone)]
pub struct RestaurantFinder {
    inner: Arc<FinderInner>,
}

impl RestaurantFinder {
    pub fn new(
        interpreter: QueryInterpreter,
        resolver: LocationResolver,
        places: PlacesSearch,
        options: FinderOptions,
    ) -> Self {
        Self {
            inner: Arc::new(FinderInner {
                interpreter,
                resolver,
                places,
                options,
            }),
        }
    }

    /// Wire the production provider clients from configuration.
    pub fn from_config(config: &FinderConfig) -> Result<Self> {
        let http = HttpClient::new(config.request_timeout)?;
        let kakao = Arc::new(KakaoClient::new(
            http.clone(),
            config.kakao_api_key.clone(),
            &config.kakao_base_url,
        ));
        let primary = Arc::new(Ip2LocationClient::new(
            http.clone(),
            config.iplocation_api_key.clone(),
            &config.ip2location_base_url,
        ));
        let secondary = Arc::new(IpApiClient::new(http, &config.ip_api_base_url));

        let resolver = LocationResolver::new(
            kakao.clone(),
            primary,
            secondary,
            config.default_country.clone(),
        );
        let places = PlacesSearch::new(kakao, config.search_radius_m);
        let options = FinderOptions {
            event_delay: config.stream_delay,
            rating_thresholds: config.rating_thresholds.clone(),
        };

        Ok(Self::new(
            QueryInterpreter::new(config.match_policy),
            resolver,
            places,
            options,
        ))
    }

    pub fn interpreter(&self) -> &QueryInterpreter {
        &self.inner.interpreter
    }

    /// Run the full pipeline and return the aggregate result.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResult> {
        let intent = self
            .inner
            .interpreter
            .interpret(&request.query, request.context.as_deref());
        let position = self.resolve_position(request, &intent).await?;
        let restaurants = self
            .inner
            .places
            .search(&position, &intent.food_phrase)
            .await?;

        info!(
            city = %position.city,
            phrase = %intent.food_phrase,
            count = restaurants.len(),
            "search completed"
        );
        Ok(SearchResult {
            position,
            restaurants,
            effective_query: intent.food_phrase,
        })
    }

    /// Default search at the caller's IP position, with no query text.
    pub async fn nearby(&self, client_ip: Option<&str>) -> Result<SearchResult> {
        let intent = SearchIntent::default();
        let position = self.inner.resolver.locate_ip(client_ip).await?;
        let restaurants = self
            .inner
            .places
            .search(&position, &intent.food_phrase)
            .await?;
        Ok(SearchResult {
            position,
            restaurants,
            effective_query: intent.food_phrase,
        })
    }

    /// Recommend one restaurant near the caller, optionally within a category.
    pub async fn recommend<R: Rng + Send>(
        &self,
        category: Option<&str>,
        client_ip: Option<&str>,
        rng: &mut R,
    ) -> Result<Restaurant> {
        let found = self.nearby(client_ip).await?;
        pick_random_restaurant(
            &found.restaurants,
            category,
            &self.inner.options.rating_thresholds,
            rng,
        )
    }

    /// Stream the pipeline as events.
    ///
    /// The location is emitted first, then one event per restaurant with the
    /// configured delay after each, then `complete`. Any failure ends the
    /// stream with a single `error` event. Dropping the stream abandons any
    /// pending provider call or delay.
    pub fn stream(&self, request: SearchRequest) -> BoxStream<'static, SearchEvent> {
        let finder = self.clone();
        let delay = self.inner.options.event_delay;

        let events = stream! {
            let mut stage = StreamStage::Start;
            debug!(%stage, query = %request.query, "stream started");

            let intent = finder
                .inner
                .interpreter
                .interpret(&request.query, request.context.as_deref());

            let position = match finder.resolve_position(&request, &intent).await {
                Ok(position) => position,
                Err(err) => {
                    error!(stage = %StreamStage::Failed, failed_at = %stage, error = %err, "stream failed");
                    yield SearchEvent::failure(&err);
                    return;
                }
            };
            stage = StreamStage::LocationResolved;
            debug!(%stage, city = %position.city, "stream progress");
            yield SearchEvent::Location { data: position.clone() };

            stage = StreamStage::Searching;
            debug!(%stage, phrase = %intent.food_phrase, "stream progress");
            let restaurants = match finder.inner.places.search(&position, &intent.food_phrase).await {
                Ok(restaurants) => restaurants,
                Err(err) => {
                    error!(stage = %StreamStage::Failed, failed_at = %stage, error = %err, "stream failed");
                    yield SearchEvent::failure(&err);
                    return;
                }
            };

            let count = restaurants.len();
            for (index, restaurant) in restaurants.into_iter().enumerate() {
                stage = StreamStage::Emitting(index);
                debug!(%stage, "stream progress");
                yield SearchEvent::Restaurant { data: restaurant };
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }

            stage = StreamStage::Complete;
            info!(%stage, count, "stream completed");
            yield SearchEvent::Complete {
                message: STREAM_COMPLETE_MESSAGE.to_string(),
                count,
            };
        };

        Box::pin(events)
    }

    async fn resolve_position(
        &self,
        request: &SearchRequest,
        intent: &SearchIntent,
    ) -> Result<Position> {
        match request.coordinates {
            Some(coordinates) => LocationResolver::from_coordinates(coordinates),
            None => {
                self.inner
                    .resolver
                    .resolve(intent, request.client_ip.as_deref())
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderError;
    use crate::test_helpers::{place_row, sample_rows, FakePlaces, FakeProviders};
    use futures::StreamExt;
    use serde_json::json;

    fn kinds(events: &[SearchEvent]) -> Vec<&'static str> {
        events
            .iter()
            .map(|event| match event {
                SearchEvent::Location { .. } => "location",
                SearchEvent::Restaurant { .. } => "restaurant",
                SearchEvent::Complete { .. } => "complete",
                SearchEvent::Error { .. } => "error",
            })
            .collect()
    }

    #[tokio::test]
    async fn search_interprets_resolves_and_searches() {
        let fakes = FakeProviders::with_sample_rows();
        let finder = fakes.finder();

        let result = finder
            .search(&SearchRequest::new("강남역 피자 추천").with_client_ip(Some("1.2.3.4".into())))
            .await
            .unwrap();

        assert_eq!(result.effective_query, "피자 맛집");
        assert_eq!(result.position.city, "강남역");
        assert_eq!(result.restaurants.len(), 3);
        assert_eq!(fakes.geocoder.calls(), vec!["강남역".to_string()]);
        assert!(fakes.primary.calls().is_empty());
        assert_eq!(fakes.places.calls()[0].phrase, "피자 맛집");
    }

    #[tokio::test]
    async fn explicit_coordinates_bypass_resolution() {
        let fakes = FakeProviders::with_sample_rows();
        let request = SearchRequest::new("near me").with_coordinates(Some(Coordinates {
            latitude: 35.1796,
            longitude: 129.0756,
        }));

        let result = fakes.finder().search(&request).await.unwrap();

        assert_eq!(result.position.latitude, 35.1796);
        assert!(fakes.primary.calls().is_empty());
        assert!(fakes.geocoder.calls().is_empty());
    }

    #[tokio::test]
    async fn invalid_explicit_coordinates_make_no_provider_call() {
        let fakes = FakeProviders::with_sample_rows();
        let request = SearchRequest::new("pizza").with_coordinates(Some(Coordinates {
            latitude: -100.0,
            longitude: 0.0,
        }));

        let err = fakes.finder().search(&request).await.unwrap_err();

        assert_eq!(err.kind(), FailureKind::InvalidCoordinates);
        assert!(fakes.places.calls().is_empty());
    }

    #[tokio::test]
    async fn stream_emits_location_restaurants_then_complete() {
        let fakes = FakeProviders::with_sample_rows();
        let events: Vec<_> = fakes
            .finder()
            .stream(SearchRequest::new("주변 맛집 추천해줘"))
            .collect()
            .await;

        assert_eq!(
            kinds(&events),
            vec!["location", "restaurant", "restaurant", "restaurant", "complete"]
        );
        let names: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                SearchEvent::Restaurant { data } => Some(data.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["진미식당", "Pizza Hall", "Sushi Bar"]);
        assert!(matches!(events.last(), Some(SearchEvent::Complete { count: 3, .. })));
    }

    #[tokio::test]
    async fn stream_failure_is_single_terminal_error() {
        let fakes = FakeProviders::new(FakePlaces::failing(ProviderError::Timeout {
            service: "kakao",
        }));
        let events: Vec<_> = fakes.finder().stream(SearchRequest::new("near me")).collect().await;

        assert_eq!(kinds(&events), vec!["location", "error"]);
        match &events[1] {
            SearchEvent::Error { kind, status, .. } => {
                assert_eq!(*kind, FailureKind::UpstreamTimeout);
                assert_eq!(*status, 504);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn stream_location_failure_emits_only_error() {
        let mut fakes = FakeProviders::with_sample_rows();
        fakes.geocoder = crate::test_helpers::FakeGeocoder::with_places(vec![]);
        let events: Vec<_> = fakes.finder().stream(SearchRequest::new("부산 횟집")).collect().await;

        assert_eq!(kinds(&events), vec!["error"]);
        assert!(fakes.places.calls().is_empty());
    }

    #[tokio::test]
    async fn dropping_stream_after_location_skips_search() {
        let fakes = FakeProviders::with_sample_rows();
        let mut events = fakes.finder().stream(SearchRequest::new("near me"));

        let first = events.next().await.unwrap();
        assert!(matches!(first, SearchEvent::Location { .. }));
        drop(events);

        assert!(fakes.places.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stream_waits_between_restaurants() {
        let fakes = FakeProviders::with_sample_rows();
        let delay = Duration::from_millis(500);
        let mut events = fakes
            .finder_with_delay(delay)
            .stream(SearchRequest::new("near me"));

        events.next().await.unwrap();
        events.next().await.unwrap();
        let started = tokio::time::Instant::now();
        let second = events.next().await.unwrap();

        assert!(matches!(second, SearchEvent::Restaurant { .. }));
        assert!(started.elapsed() >= delay);
    }

    #[tokio::test]
    async fn malformed_row_is_dropped_from_stream() {
        let mut rows = sample_rows();
        rows.insert(1, place_row("No Distance", "somewhere", "음식점", "?"));
        let fakes = FakeProviders::new(FakePlaces::with_rows(rows));

        let events: Vec<_> = fakes.finder().stream(SearchRequest::new("near me")).collect().await;

        assert_eq!(
            kinds(&events),
            vec!["location", "restaurant", "restaurant", "restaurant", "complete"]
        );
    }

    #[tokio::test]
    async fn nearby_always_uses_ip() {
        let fakes = FakeProviders::with_sample_rows();
        let result = fakes.finder().nearby(Some("5.6.7.8")).await.unwrap();

        assert_eq!(result.effective_query, crate::keywords::DEFAULT_FOOD_PHRASE);
        assert_eq!(fakes.primary.calls(), vec![Some("5.6.7.8".to_string())]);
        assert!(fakes.geocoder.calls().is_empty());
    }

    #[tokio::test]
    async fn recommend_prefers_highest_rating_tier() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let fakes = FakeProviders::with_sample_rows();
        let mut rng = StdRng::seed_from_u64(11);
        let pick = fakes.finder().recommend(None, None, &mut rng).await.unwrap();
        assert_eq!(pick.name, "Pizza Hall");

        let pick = fakes
            .finder()
            .recommend(Some("초밥"), None, &mut rng)
            .await
            .unwrap();
        assert_eq!(pick.name, "Sushi Bar");
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = SearchEvent::Complete {
            message: STREAM_COMPLETE_MESSAGE.into(),
            count: 3,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value, json!({"type": "complete", "message": "Streaming complete.", "count": 3}));
        assert!(event.is_terminal());
    }

    #[test]
    fn failure_event_carries_kind_and_status() {
        let err = Error::UpstreamTimeout {
            service: "kakao".into(),
        };
        let value = serde_json::to_value(SearchEvent::failure(&err)).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["kind"], "upstream_timeout");
        assert_eq!(value["status"], 504);
    }

    #[test]
    fn request_builder_sets_fields() {
        let request = SearchRequest::new("pizza")
            .with_context(Some("홍대".into()))
            .with_client_ip(Some("1.2.3.4".into()));
        assert_eq!(request.query, "pizza");
        assert_eq!(request.context.as_deref(), Some("홍대"));
        assert!(request.coordinates.is_none());
    }

    #[test]
    fn stage_labels() {
        assert_eq!(StreamStage::Emitting(2).to_string(), "emitting(2)");
        assert_eq!(StreamStage::LocationResolved.to_string(), "location_resolved");
    }
}
