use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::{Error, Result};
use crate::keywords::DEFAULT_FOOD_PHRASE;
use crate::model::Restaurant;

/// Pick one restaurant at random.
///
/// When `category` is given only restaurants whose category contains it
/// (case-insensitively) are eligible. Among the eligible rows, the first
/// rating tier in `thresholds` that has any candidate wins; if no tier has
/// one, every eligible row is a candidate.
pub fn pick_random_restaurant<R: Rng + ?Sized>(
    restaurants: &[Restaurant],
    category: Option<&str>,
    thresholds: &[f64],
    rng: &mut R,
) -> Result<Restaurant> {
    let category = category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_lowercase);

    let eligible: Vec<&Restaurant> = restaurants
        .iter()
        .filter(|r| match &category {
            Some(wanted) => r.category.to_lowercase().contains(wanted.as_str()),
            None => true,
        })
        .collect();

    let tier = thresholds
        .iter()
        .map(|threshold| {
            eligible
                .iter()
                .copied()
                .filter(|r| r.rating.is_some_and(|rating| rating >= *threshold))
                .collect::<Vec<_>>()
        })
        .find(|candidates| !candidates.is_empty());

    let candidates = tier.unwrap_or(eligible);
    debug!(candidates = candidates.len(), ?category, "random recommendation");

    candidates
        .choose(rng)
        .map(|r| (*r).clone())
        .ok_or_else(|| Error::no_results(category.as_deref().unwrap_or(DEFAULT_FOOD_PHRASE)))
}
