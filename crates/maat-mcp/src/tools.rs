//! MCP tool implementations
//!
//! - find_restaurants: interpret a query, resolve a position, search nearby
//! - find_random_restaurant: one restaurant near the caller, optionally
//!   within a category, preferring the best rated

use maat_lib::{Restaurant, RestaurantFinder, SearchRequest, SearchResult};
use rand::Rng;
use tracing::{debug, info};

use crate::types::*;
use crate::Error;

/// Longest accepted query, context or category, in characters.
pub const MAX_TEXT_CHARS: usize = 500;

/// Restaurant search tool handler
///
/// Runs the full pipeline and returns the aggregate result. The stdio
/// transport has no caller address, so IP resolution lets the provider
/// infer it.
pub struct FindRestaurantsTool;

impl FindRestaurantsTool {
    pub async fn execute(
        finder: &RestaurantFinder,
        input: FindRestaurantsInput,
    ) -> crate::Result<SearchResult> {
        Self::validate_input(&input)?;
        info!(query = %input.query, has_context = input.context.is_some(), "find_restaurants");

        let request = SearchRequest::new(input.query).with_context(input.context);
        let result = finder.search(&request).await?;

        debug!(
            city = %result.position.city,
            count = result.restaurants.len(),
            "find_restaurants completed"
        );
        Ok(result)
    }

    fn validate_input(input: &FindRestaurantsInput) -> crate::Result<()> {
        check_length("query", &input.query)?;
        if let Some(context) = &input.context {
            check_length("context", context)?;
        }
        Ok(())
    }
}

/// Random recommendation tool handler
pub struct FindRandomRestaurantTool;

impl FindRandomRestaurantTool {
    pub async fn execute<R: Rng + Send>(
        finder: &RestaurantFinder,
        input: FindRandomRestaurantInput,
        rng: &mut R,
    ) -> crate::Result<Restaurant> {
        let category = input
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        if let Some(category) = category {
            check_length("category", category)?;
        }
        info!(category = ?category, "find_random_restaurant");

        let restaurant = finder.recommend(category, None, rng).await?;
        debug!(name = %restaurant.name, rating = ?restaurant.rating, "recommended");
        Ok(restaurant)
    }
}

fn check_length(param: &str, value: &str) -> crate::Result<()> {
    if value.chars().count() > MAX_TEXT_CHARS {
        return Err(Error::invalid_param(
            param,
            format!("Must be at most {} characters", MAX_TEXT_CHARS),
        ));
    }
    Ok(())
}
