//! Runtime configuration for the finder.
//!
//! # Environment Variables
//!
//! - `KAKAO_API_KEY`: places/geocoding provider key (required at call time)
//! - `IPLOCATION_API_KEY`: optional key for the primary IP-geolocation provider
//! - `MAAT_SEARCH_RADIUS_M`: search radius in metres (default: 1000)
//! - `MAAT_REQUEST_TIMEOUT_SECS`: per-call timeout (default: 5)
//! - `MAAT_STREAM_DELAY_MS`: delay between streamed restaurants (default: 500)
//! - `MAAT_RATING_THRESHOLDS`: comma-separated rating tiers (default: 4.5,4.0,3.8)
//! - `MAAT_MATCH_POLICY`: `longest` (default) or `first`
//! - `MAAT_DEFAULT_COUNTRY`: country reported for geocoded positions

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, warn};

use crate::keywords::MatchPolicy;

pub const DEFAULT_SEARCH_RADIUS_M: u32 = 1000;
/// Upper bound accepted by the places provider.
pub const MAX_SEARCH_RADIUS_M: u32 = 20_000;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_STREAM_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_RATING_THRESHOLDS: [f64; 3] = [4.5, 4.0, 3.8];
pub const DEFAULT_COUNTRY: &str = "South Korea";

pub const KAKAO_BASE_URL: &str = "https://dapi.kakao.com";
pub const IP2LOCATION_BASE_URL: &str = "https://api.ip2location.io";
pub const IP_API_BASE_URL: &str = "http://ip-api.com";

/// Finder configuration.
#[derive(Clone)]
pub struct FinderConfig {
    pub kakao_api_key: Option<String>,
    pub iplocation_api_key: Option<String>,
    pub search_radius_m: u32,
    pub request_timeout: Duration,
    pub stream_delay: Duration,
    pub rating_thresholds: Vec<f64>,
    pub match_policy: MatchPolicy,
    pub default_country: String,
    pub kakao_base_url: String,
    pub ip2location_base_url: String,
    pub ip_api_base_url: String,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            kakao_api_key: None,
            iplocation_api_key: None,
            search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            stream_delay: DEFAULT_STREAM_DELAY,
            rating_thresholds: DEFAULT_RATING_THRESHOLDS.to_vec(),
            match_policy: MatchPolicy::default(),
            default_country: DEFAULT_COUNTRY.to_string(),
            kakao_base_url: KAKAO_BASE_URL.to_string(),
            ip2location_base_url: IP2LOCATION_BASE_URL.to_string(),
            ip_api_base_url: IP_API_BASE_URL.to_string(),
        }
    }
}

impl FinderConfig {
    /// Create configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    /// Malformed numeric values fall back to their defaults with a warning.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            kakao_api_key: non_empty_var("KAKAO_API_KEY"),
            iplocation_api_key: non_empty_var("IPLOCATION_API_KEY"),
            search_radius_m: parse_var("MAAT_SEARCH_RADIUS_M", defaults.search_radius_m)
                .clamp(1, MAX_SEARCH_RADIUS_M),
            request_timeout: Duration::from_secs(parse_var(
                "MAAT_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            stream_delay: Duration::from_millis(parse_var(
                "MAAT_STREAM_DELAY_MS",
                defaults.stream_delay.as_millis() as u64,
            )),
            rating_thresholds: env::var("MAAT_RATING_THRESHOLDS")
                .ok()
                .and_then(|v| parse_thresholds(&v))
                .unwrap_or(defaults.rating_thresholds),
            match_policy: env::var("MAAT_MATCH_POLICY")
                .map(|v| MatchPolicy::from_name(&v))
                .unwrap_or_default(),
            default_country: non_empty_var("MAAT_DEFAULT_COUNTRY")
                .unwrap_or(defaults.default_country),
            kakao_base_url: non_empty_var("MAAT_KAKAO_BASE_URL")
                .unwrap_or(defaults.kakao_base_url),
            ip2location_base_url: non_empty_var("MAAT_IP2LOCATION_BASE_URL")
                .unwrap_or(defaults.ip2location_base_url),
            ip_api_base_url: non_empty_var("MAAT_IP_API_BASE_URL")
                .unwrap_or(defaults.ip_api_base_url),
        };

        debug!(config = ?config, "finder configuration loaded");
        config
    }

    /// Whether the places provider key is present.
    pub fn has_places_key(&self) -> bool {
        self.kakao_api_key.is_some()
    }
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("kakao_api_key", &redact(&self.kakao_api_key))
            .field("iplocation_api_key", &redact(&self.iplocation_api_key))
            .field("search_radius_m", &self.search_radius_m)
            .field("request_timeout", &self.request_timeout)
            .field("stream_delay", &self.stream_delay)
            .field("rating_thresholds", &self.rating_thresholds)
            .field("match_policy", &self.match_policy)
            .field("default_country", &self.default_country)
            .finish()
    }
}

fn redact(key: &Option<String>) -> &'static str {
    if key.is_some() {
        "<set>"
    } else {
        "<not set>"
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(variable = name, value = %raw, default = %default, "ignoring malformed value");
            default
        }),
        Err(_) => default,
    }
}

/// Parse a comma-separated list of rating thresholds.
///
/// Returns `None` when any entry is not a number.
pub fn parse_thresholds(raw: &str) -> Option<Vec<f64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok())
        .collect()
}
