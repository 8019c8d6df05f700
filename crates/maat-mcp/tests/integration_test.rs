//! Integration tests for the MCP tool, resource and prompt surface
//!
//! These drive the public handlers against in-memory providers, the way a
//! client session would use them.

use maat_lib::providers::ProviderError;
use maat_lib::test_helpers::{FakeGeocoder, FakePlaces, FakeProviders};
use maat_lib::MatchPolicy;
use maat_mcp::prompts::{restaurant_recommendation, RECOMMENDATION_PROMPT};
use maat_mcp::resources::{resource_descriptors, KeywordsResource, NearbyResource};
use maat_mcp::tools::{FindRandomRestaurantTool, FindRestaurantsTool};
use maat_mcp::types::{FindRandomRestaurantInput, FindRestaurantsInput, RecommendationPromptArgs};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;

#[tokio::test]
async fn test_prompt_then_search_session() {
    let args = RecommendationPromptArgs {
        query: "여의도 파스타".to_string(),
        context: None,
    };
    let prompt = restaurant_recommendation(&args).unwrap();
    assert!(prompt.contains("여의도 파스타"));
    assert_eq!(RECOMMENDATION_PROMPT, "restaurant_recommendation");

    let fakes = FakeProviders::with_sample_rows();
    let result = FindRestaurantsTool::execute(
        &fakes.finder(),
        FindRestaurantsInput {
            query: args.query,
            context: args.context,
        },
    )
    .await
    .unwrap();

    assert_eq!(result.effective_query, "파스타 맛집");
    assert_eq!(fakes.geocoder.calls(), vec!["여의도".to_string()]);
    let names: Vec<&str> = result.restaurants.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["진미식당", "Pizza Hall", "Sushi Bar"]);
}

#[tokio::test]
async fn test_unknown_place_is_location_not_found() {
    let mut fakes = FakeProviders::with_sample_rows();
    fakes.geocoder = FakeGeocoder::with_places(Vec::new());

    let err = FindRestaurantsTool::execute(
        &fakes.finder(),
        FindRestaurantsInput {
            query: "잠실 치킨".to_string(),
            context: None,
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.code, 404);
    assert!(fakes.places.calls().is_empty());
}

#[tokio::test]
async fn test_search_failure_is_bad_gateway() {
    let fakes = FakeProviders::new(FakePlaces::failing(ProviderError::Status {
        service: "kakao",
        status: 500,
    }));

    let err = FindRestaurantsTool::execute(&fakes.finder(), FindRestaurantsInput::default())
        .await
        .unwrap_err();

    assert_eq!(err.code, 502);
    let body: Value = serde_json::to_value(&err).unwrap();
    assert_eq!(body["type"], "/problems/search-failed");
}

#[tokio::test]
async fn test_random_pick_is_deterministic_with_seed() {
    let fakes = FakeProviders::with_sample_rows();
    let finder = fakes.finder();

    let first = FindRandomRestaurantTool::execute(
        &finder,
        FindRandomRestaurantInput::default(),
        &mut StdRng::seed_from_u64(42),
    )
    .await
    .unwrap();
    let second = FindRandomRestaurantTool::execute(
        &finder,
        FindRandomRestaurantInput::default(),
        &mut StdRng::seed_from_u64(42),
    )
    .await
    .unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_resources_are_readable() {
    let fakes = FakeProviders::with_sample_rows();

    for descriptor in resource_descriptors() {
        let body = match descriptor.uri {
            "restaurants://nearby" => NearbyResource::read(&fakes.finder()).await.unwrap(),
            "restaurants://keywords" => KeywordsResource::read(MatchPolicy::FirstListed)
                .await
                .unwrap(),
            other => panic!("unexpected resource {other}"),
        };
        let value: Value = serde_json::from_str(&body).unwrap();
        assert!(value.is_object(), "{} is not a JSON object", descriptor.uri);
    }
}
