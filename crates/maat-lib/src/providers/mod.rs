//! Outbound provider capabilities.
//!
//! Each external service is reached through a small async trait so the
//! resolver and the places search can be exercised against in-memory fakes.
//! Concrete clients live in the submodules.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod ip2location;
pub mod ip_api;
pub mod kakao;

pub use ip2location::Ip2LocationClient;
pub use ip_api::IpApiClient;
pub use kakao::KakaoClient;

/// Failure reported by a provider client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("{service} did not respond in time")]
    Timeout { service: &'static str },

    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    /// The response lacked a field the provider guarantees.
    #[error("{service} response violated its contract: {message}")]
    Contract {
        service: &'static str,
        message: String,
    },

    /// The provider answered but flagged the lookup as unsuccessful.
    #[error("{service} rejected the lookup: {message}")]
    Rejected {
        service: &'static str,
        message: String,
    },

    #[error("{service} requires {variable} to be set")]
    MissingKey {
        service: &'static str,
        variable: &'static str,
    },
}

impl ProviderError {
    pub fn service(&self) -> &'static str {
        match self {
            ProviderError::Timeout { service }
            | ProviderError::Status { service, .. }
            | ProviderError::Transport { service, .. }
            | ProviderError::Contract { service, .. }
            | ProviderError::Rejected { service, .. }
            | ProviderError::MissingKey { service, .. } => service,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout { .. })
    }
}

/// First-hit candidate for a named location.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Position reported by an IP-geolocation provider.
#[derive(Debug, Clone, PartialEq)]
pub struct IpLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub country: String,
}

/// Parameters of one keyword search around a point.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceQuery {
    /// Passed through verbatim.
    pub phrase: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: u32,
}

/// Unvalidated place row as returned by a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceRow {
    pub name: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub distance: Option<Value>,
    pub rating: Option<Value>,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Look up a named location; results are ordered by relevance.
    async fn geocode(&self, name: &str) -> Result<Vec<GeocodedPlace>, ProviderError>;
}

#[async_trait]
pub trait IpLocator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Locate `ip`, or the caller's own address when `ip` is `None`.
    async fn locate(&self, ip: Option<&str>) -> Result<IpLocation, ProviderError>;
}

#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Keyword search sorted by ascending distance.
    async fn keyword_search(&self, query: &PlaceQuery) -> Result<Vec<PlaceRow>, ProviderError>;
}

/// Read a JSON number or numeric string as `f64`.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
