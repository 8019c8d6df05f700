//! MCP resource implementations
//!
//! - restaurants://nearby: default search around the caller's IP position
//! - restaurants://keywords: the phrase, place and food tables the query
//!   interpreter matches against

use maat_lib::keywords::{FOOD_KEYWORDS, LOCATION_NAMES, PROXIMITY_PHRASES};
use maat_lib::{MatchPolicy, RestaurantFinder, DEFAULT_FOOD_PHRASE};
use serde::{Deserialize, Serialize};

use crate::types::{FoodKeyword, KeywordCatalog};
use crate::Result;

pub const NEARBY_URI: &str = "restaurants://nearby";
pub const KEYWORDS_URI: &str = "restaurants://keywords";

/// Descriptor for MCP resources exposed by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub uri: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

/// Resources exposed by the server, in listing order.
pub fn resource_descriptors() -> Vec<ResourceDescriptor> {
    vec![
        ResourceDescriptor {
            uri: NEARBY_URI,
            title: "Nearby Restaurants",
            description: "Restaurants around the caller's approximate position, resolved from its IP address",
        },
        ResourceDescriptor {
            uri: KEYWORDS_URI,
            title: "Query Keywords",
            description: "Proximity phrases, place names and food keywords understood in queries",
        },
    ]
}

/// Nearby restaurants resource
///
/// Ignores any query text and always resolves the position via IP.
pub struct NearbyResource;

impl NearbyResource {
    pub async fn read(finder: &RestaurantFinder) -> Result<String> {
        let result = finder.nearby(None).await?;
        serde_json::to_string(&result).map_err(|e| crate::Error::internal(e.to_string()))
    }
}

/// Keyword tables resource
pub struct KeywordsResource;

impl KeywordsResource {
    pub async fn read(policy: MatchPolicy) -> Result<String> {
        let catalog = KeywordCatalog {
            proximity_phrases: PROXIMITY_PHRASES.to_vec(),
            location_names: LOCATION_NAMES.to_vec(),
            food_keywords: FOOD_KEYWORDS
                .iter()
                .map(|&(keyword, phrase)| FoodKeyword { keyword, phrase })
                .collect(),
            default_phrase: DEFAULT_FOOD_PHRASE,
            match_policy: match policy {
                MatchPolicy::LongestMatch => "longest".to_string(),
                MatchPolicy::FirstListed => "first".to_string(),
            },
        };

        serde_json::to_string(&catalog).map_err(|e| crate::Error::internal(e.to_string()))
    }
}
