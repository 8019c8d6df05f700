//! maat library entry points.
//!
//! This crate interprets free-text restaurant queries, resolves a position
//! (explicit coordinates, a named place, or the caller's IP address), and
//! searches a places provider for nearby restaurants. The HTTP service and
//! the MCP server are thin adapters over [`RestaurantFinder`] and should not
//! reimplement any of this behavior.
//!

pub mod config;
pub mod error;
pub mod finder;
pub mod http;
pub mod intent;
pub mod keywords;
pub mod location;
pub mod model;
pub mod places;
pub mod providers;
pub mod recommend;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;

pub use config::FinderConfig;
pub use error::{Error, FailureKind, Result};
pub use finder::{FinderOptions, RestaurantFinder, SearchEvent, SearchRequest, StreamStage};
pub use intent::QueryInterpreter;
pub use keywords::{MatchPolicy, DEFAULT_FOOD_PHRASE};
pub use location::LocationResolver;
pub use model::{Coordinates, Position, Restaurant, SearchIntent, SearchResult};
pub use places::PlacesSearch;
pub use recommend::pick_random_restaurant;
