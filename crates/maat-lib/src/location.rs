//! Position resolution: explicit coordinates, named places, then IP lookup.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{Coordinates, Position, SearchIntent};
use crate::providers::{Geocoder, IpLocation, IpLocator, ProviderError};

/// Resolves a [`SearchIntent`] into a [`Position`].
///
/// Named locations go through the geocoder unless the intent asks for the
/// caller's own position. IP lookups try the primary provider once and fall
/// back to the secondary provider once, with the same IP.
#[derive(Clone)]
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    primary: Arc<dyn IpLocator>,
    secondary: Arc<dyn IpLocator>,
    default_country: String,
}

impl LocationResolver {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        primary: Arc<dyn IpLocator>,
        secondary: Arc<dyn IpLocator>,
        default_country: impl Into<String>,
    ) -> Self {
        Self {
            geocoder,
            primary,
            secondary,
            default_country: default_country.into(),
        }
    }

    /// Resolve the intent, using `client_ip` for IP-based lookup.
    pub async fn resolve(&self, intent: &SearchIntent, client_ip: Option<&str>) -> Result<Position> {
        match (&intent.location_name, intent.use_current_location) {
            (Some(name), false) => self.geocode(name).await,
            _ => self.locate_ip(client_ip).await,
        }
    }

    /// Build a position from caller-supplied coordinates.
    pub fn from_coordinates(coordinates: Coordinates) -> Result<Position> {
        Position::new(coordinates.latitude, coordinates.longitude, "", "")
    }

    async fn geocode(&self, name: &str) -> Result<Position> {
        let places = self
            .geocoder
            .geocode(name)
            .await
            .map_err(|err| geocoding_error(name, err))?;

        let first = places.into_iter().next().ok_or_else(|| Error::LocationNotFound {
            name: name.to_string(),
        })?;
        debug!(name, matched = %first.name, "geocoded location");

        Position::new(first.latitude, first.longitude, name, self.default_country.clone()).map_err(
            |err| Error::LocationUnavailable {
                message: format!("geocoder returned {}", err),
            },
        )
    }

    /// Locate `client_ip` through the primary provider, then the secondary.
    ///
    /// When both fail and either one timed out, the result is
    /// [`Error::UpstreamTimeout`] naming the provider that timed out, the
    /// secondary taking precedence.
    pub async fn locate_ip(&self, client_ip: Option<&str>) -> Result<Position> {
        let primary_failure = match lookup(self.primary.as_ref(), client_ip).await {
            Ok(position) => return Ok(position),
            Err(reason) => reason,
        };
        warn!(
            provider = self.primary.name(),
            fallback = self.secondary.name(),
            reason = %primary_failure,
            "primary IP geolocation failed, falling back"
        );

        let secondary_failure = match lookup(self.secondary.as_ref(), client_ip).await {
            Ok(position) => return Ok(position),
            Err(reason) => reason,
        };

        match secondary_failure
            .timed_out()
            .or_else(|| primary_failure.timed_out())
        {
            Some(service) => Err(Error::UpstreamTimeout {
                service: service.to_string(),
            }),
            None => Err(Error::LocationUnavailable {
                message: format!("{}; {}", primary_failure, secondary_failure),
            }),
        }
    }
}

enum LookupFailure {
    Provider(ProviderError),
    Invalid {
        provider: &'static str,
        source: Error,
    },
}

impl LookupFailure {
    /// Service name when the failure was a timeout.
    fn timed_out(&self) -> Option<&'static str> {
        match self {
            LookupFailure::Provider(err) if err.is_timeout() => Some(err.service()),
            _ => None,
        }
    }
}

impl std::fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupFailure::Provider(err) => write!(f, "{}", err),
            LookupFailure::Invalid { provider, source } => write!(f, "{}: {}", provider, source),
        }
    }
}

async fn lookup(
    locator: &dyn IpLocator,
    client_ip: Option<&str>,
) -> std::result::Result<Position, LookupFailure> {
    let IpLocation {
        latitude,
        longitude,
        city,
        country,
    } = locator
        .locate(client_ip)
        .await
        .map_err(LookupFailure::Provider)?;

    let position = Position::new(latitude, longitude, city, country).map_err(|source| {
        LookupFailure::Invalid {
            provider: locator.name(),
            source,
        }
    })?;
    info!(
        provider = locator.name(),
        city = %position.city,
        country = %position.country,
        "resolved position from IP"
    );
    Ok(position)
}

fn geocoding_error(name: &str, err: ProviderError) -> Error {
    match err {
        ProviderError::Timeout { service } => Error::UpstreamTimeout {
            service: service.to_string(),
        },
        ProviderError::MissingKey { variable, .. } => Error::ConfigurationMissing {
            name: variable.to_string(),
        },
        other => Error::LocationUnavailable {
            message: format!("geocoding '{}' failed: {}", name, other),
        },
    }
}
