//! Type definitions for MCP tool and prompt arguments
//!
//! Inputs derive `JsonSchema` so the tool and prompt schemas advertised to
//! clients are generated from the same types that deserialize the calls.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// TOOL INPUTS
// ============================================================================

/// Input for the find_restaurants tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FindRestaurantsInput {
    /// What to look for, e.g. "강남역 초밥" or "pizza near me"
    #[serde(default)]
    pub query: String,

    /// Earlier conversation; a place or food named here wins over the query
    #[serde(default)]
    pub context: Option<String>,
}

/// Input for the find_random_restaurant tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FindRandomRestaurantInput {
    /// Category to draw from, matched case-insensitively (e.g. "일식", "cafe")
    #[serde(default)]
    pub category: Option<String>,
}

// ============================================================================
// PROMPT ARGUMENTS
// ============================================================================

/// Arguments of the restaurant_recommendation prompt
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecommendationPromptArgs {
    /// What the user asked for
    pub query: String,

    /// Earlier conversation, if any
    #[serde(default)]
    pub context: Option<String>,
}

// ============================================================================
// RESOURCE PAYLOADS
// ============================================================================

/// Body of the restaurants://keywords resource
#[derive(Debug, Clone, Serialize)]
pub struct KeywordCatalog {
    /// Phrases that select the caller's current position
    pub proximity_phrases: Vec<&'static str>,

    /// Place names that are geocoded
    pub location_names: Vec<&'static str>,

    /// Food keywords and the search phrase each maps to
    pub food_keywords: Vec<FoodKeyword>,

    /// Phrase searched when no food keyword matches
    pub default_phrase: &'static str,

    /// How overlapping matches are resolved ("longest" or "first")
    pub match_policy: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodKeyword {
    pub keyword: &'static str,
    pub phrase: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_restaurants_input_defaults() {
        let input: FindRestaurantsInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input.query, "");
        assert!(input.context.is_none());
    }

    #[test]
    fn test_random_input_category_optional() {
        let input: FindRandomRestaurantInput =
            serde_json::from_str(r#"{"category":"일식"}"#).unwrap();
        assert_eq!(input.category.as_deref(), Some("일식"));
    }

    #[test]
    fn test_prompt_args_require_query() {
        let result: Result<RecommendationPromptArgs, _> = serde_json::from_str(r#"{}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_input_schema_lists_fields() {
        let schema = serde_json::to_value(schemars::schema_for!(FindRestaurantsInput)).unwrap();
        assert!(schema["properties"]["query"].is_object());
        assert!(schema["properties"]["context"].is_object());
    }
}
