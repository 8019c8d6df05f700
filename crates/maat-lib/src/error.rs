use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keywords::DEFAULT_FOOD_PHRASE;

/// Convenient result alias for the maat library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Every component surfaces its own failure kind; callers map the kind to a
/// transport-specific status with [`Error::status_code`].
#[derive(Debug, Error)]
pub enum Error {
    /// Latitude or longitude outside the legal range.
    #[error("invalid coordinates: latitude {latitude} must be within [-90, 90] and longitude {longitude} within [-180, 180]")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// Geocoding a named location returned no results.
    #[error("location '{name}' could not be found")]
    LocationNotFound { name: String },

    /// Every location resolution path failed.
    #[error("location unavailable: {message}")]
    LocationUnavailable { message: String },

    /// An upstream provider did not answer within the request timeout.
    #[error("{service} did not respond in time")]
    UpstreamTimeout { service: String },

    /// The places provider could not be queried or answered out of contract.
    #[error("restaurant search failed: {message}")]
    SearchFailed { message: String },

    /// The search produced no usable rows.
    #[error("{message}")]
    NoResults { phrase: String, message: String },

    /// A required provider key is not configured.
    #[error("{name} is not configured")]
    ConfigurationMissing { name: String },

    /// The outbound HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl Error {
    /// Build the `NoResults` error for an empty search.
    ///
    /// The message differs depending on whether the generic default phrase
    /// was used, so callers can ask for a more specific request.
    pub fn no_results(phrase: &str) -> Self {
        let message = if phrase == DEFAULT_FOOD_PHRASE {
            "No restaurants were found nearby. Please be more specific about the food or area you are looking for.".to_string()
        } else {
            format!(
                "No restaurants were found for '{}'. Try another kind of food or a different area.",
                phrase
            )
        };
        Error::NoResults {
            phrase: phrase.to_string(),
            message,
        }
    }

    /// Failure kind of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::InvalidCoordinates { .. } => FailureKind::InvalidCoordinates,
            Error::LocationNotFound { .. } => FailureKind::LocationNotFound,
            Error::LocationUnavailable { .. } => FailureKind::LocationUnavailable,
            Error::UpstreamTimeout { .. } => FailureKind::UpstreamTimeout,
            Error::SearchFailed { .. } => FailureKind::SearchFailed,
            Error::NoResults { .. } => FailureKind::NoResults,
            Error::ConfigurationMissing { .. } => FailureKind::ConfigurationMissing,
            Error::HttpClient(_) => FailureKind::Internal,
        }
    }

    /// HTTP-style status code for this error.
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}

/// Machine-readable failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidCoordinates,
    LocationNotFound,
    LocationUnavailable,
    UpstreamTimeout,
    SearchFailed,
    NoResults,
    ConfigurationMissing,
    Internal,
}

impl FailureKind {
    /// Caller-facing HTTP status for the kind.
    pub fn status_code(self) -> u16 {
        match self {
            FailureKind::InvalidCoordinates => 400,
            FailureKind::LocationNotFound | FailureKind::NoResults => 404,
            FailureKind::UpstreamTimeout => 504,
            FailureKind::LocationUnavailable | FailureKind::SearchFailed => 502,
            FailureKind::ConfigurationMissing | FailureKind::Internal => 500,
        }
    }

    /// Stable snake_case label, used for metrics and problem type URIs.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::InvalidCoordinates => "invalid_coordinates",
            FailureKind::LocationNotFound => "location_not_found",
            FailureKind::LocationUnavailable => "location_unavailable",
            FailureKind::UpstreamTimeout => "upstream_timeout",
            FailureKind::SearchFailed => "search_failed",
            FailureKind::NoResults => "no_results",
            FailureKind::ConfigurationMissing => "configuration_missing",
            FailureKind::Internal => "internal",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
