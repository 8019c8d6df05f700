//! Search-intent extraction from free text.

use tracing::debug;

use crate::keywords::{
    find_keyword, KeywordEntry, MatchPolicy, DEFAULT_FOOD_PHRASE, FOOD_INDEX, LOCATION_INDEX,
    PROXIMITY_INDEX,
};
use crate::model::SearchIntent;

/// Maps a query and optional conversational context to a [`SearchIntent`].
///
/// Matching is case-insensitive substring lookup against the fixed tables in
/// [`crate::keywords`]. A match in the context takes precedence over a match
/// in the query.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryInterpreter {
    policy: MatchPolicy,
}

impl QueryInterpreter {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Extract location, food phrase and proximity intent.
    pub fn interpret(&self, query: &str, context: Option<&str>) -> SearchIntent {
        let query = query.to_lowercase();
        let context = context
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_lowercase);

        let combined = match &context {
            Some(context) => format!("{} {}", query, context),
            None => query.clone(),
        };

        let use_current_location = PROXIMITY_INDEX
            .iter()
            .any(|phrase| combined.contains(phrase.as_str()));

        let location_name = self
            .lookup(&query, context.as_deref(), &LOCATION_INDEX)
            .map(str::to_string);

        let food_phrase = self
            .lookup(&query, context.as_deref(), &FOOD_INDEX)
            .unwrap_or(DEFAULT_FOOD_PHRASE)
            .to_string();

        let intent = SearchIntent {
            location_name,
            food_phrase,
            use_current_location,
        };
        debug!(?intent, "interpreted query");
        intent
    }

    fn lookup(
        &self,
        query: &str,
        context: Option<&str>,
        index: &[KeywordEntry],
    ) -> Option<&'static str> {
        context
            .and_then(|c| find_keyword(c, index, self.policy))
            .or_else(|| find_keyword(query, index, self.policy))
            .map(|entry| entry.value)
    }
}
