//! Application state shared by the axum handlers.

use std::sync::Arc;

use maat_lib::{Error as LibError, FinderConfig, RestaurantFinder};

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// The outbound HTTP client could not be built.
    Finder(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finder(e) => write!(f, "failed to build restaurant finder: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Finder(e) => Some(e),
        }
    }
}

impl From<LibError> for AppStateError {
    fn from(err: LibError) -> Self {
        Self::Finder(err)
    }
}

/// Shared application state for all axum handlers.
///
/// Cheap to clone; share it through axum's `State` extractor.
///
/// ```ignore
/// use axum::{Router, routing::post};
/// use maat_service_shared::AppState;
///
/// let state = AppState::from_config(&FinderConfig::from_env())?;
/// let app = Router::new()
///     .route("/api/v1/search", post(search))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    finder: RestaurantFinder,
    places_configured: bool,
}

impl AppState {
    pub fn new(finder: RestaurantFinder, places_configured: bool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                finder,
                places_configured,
            }),
        }
    }

    /// Build production state from configuration.
    ///
    /// A missing places key does not fail startup; readiness reports it and
    /// searches fail with `ConfigurationMissing`.
    pub fn from_config(config: &FinderConfig) -> Result<Self, AppStateError> {
        let finder = RestaurantFinder::from_config(config)?;
        if !config.has_places_key() {
            tracing::warn!("KAKAO_API_KEY is not set; searches will fail until it is configured");
        }
        Ok(Self::new(finder, config.has_places_key()))
    }

    pub fn finder(&self) -> &RestaurantFinder {
        &self.inner.finder
    }

    /// Whether the places provider key is configured.
    pub fn places_configured(&self) -> bool {
        self.inner.places_configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_without_key_is_not_ready() {
        let state = AppState::from_config(&FinderConfig::default()).unwrap();
        assert!(!state.places_configured());
    }

    #[test]
    fn test_from_config_with_key() {
        let config = FinderConfig {
            kakao_api_key: Some("key".into()),
            ..FinderConfig::default()
        };
        let state = AppState::from_config(&config).unwrap();
        assert!(state.places_configured());
    }

    #[test]
    fn test_state_error_display() {
        let err = AppStateError::from(LibError::ConfigurationMissing {
            name: "KAKAO_API_KEY".into(),
        });
        assert!(err.to_string().contains("KAKAO_API_KEY"));
    }
}
