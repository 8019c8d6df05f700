//! MCP prompt templates
//!
//! `restaurant_recommendation` walks an assistant through answering a food
//! request with the tools and resources of this server.

use crate::types::RecommendationPromptArgs;
use crate::{Error, Result};

pub const RECOMMENDATION_PROMPT: &str = "restaurant_recommendation";

/// Render the restaurant_recommendation prompt.
pub fn restaurant_recommendation(args: &RecommendationPromptArgs) -> Result<String> {
    let query = args.query.trim();
    if query.is_empty() {
        return Err(Error::invalid_param("query", "Missing required argument"));
    }

    let context = match args.context.as_deref().map(str::trim) {
        Some(context) if !context.is_empty() => format!(
            "\n## Conversation so far\n{context}\n\nPass this as `context`; a place or food named there takes precedence over the request.\n"
        ),
        _ => String::new(),
    };

    Ok(format!(
        r#"# Restaurant Recommendation

The user asked: **{query}**
{context}
## Steps
1. Call `find_restaurants` with `query` set to the request above.
   - A place name such as "강남역 초밥" or "Hongdae pizza" searches around
     that place.
   - Phrases like "near me" or "근처" search around the user's current
     position and override any place name, so leave them out when the user
     names an area.
2. If the user only wants a pick, call `find_random_restaurant`, with a
   `category` when one was mentioned (e.g. "일식", "cafe").
3. If nothing is found, suggest a different food or area; the
   `restaurants://keywords` resource lists the places and foods understood.

## Expected Output
Recommend up to five restaurants with name, address, category and walking
distance, nearest first. Mention the area the search was centred on."#
    ))
}
