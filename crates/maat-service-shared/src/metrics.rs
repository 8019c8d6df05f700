//! Prometheus metrics for the restaurant finder.
//!
//! - [`MetricsConfig`] / [`init_metrics`]: install the Prometheus recorder
//! - [`metrics_handler`]: render the exposition text for `/metrics`
//! - search helpers recording per-surface outcomes
//!
//! Before [`init_metrics`] runs, the `metrics` macros are no-ops.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use maat_lib::FailureKind;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

pub const SEARCHES_TOTAL: &str = "maat_searches_total";
pub const SEARCHES_FAILED_TOTAL: &str = "maat_searches_failed_total";
pub const RESTAURANTS_RETURNED: &str = "maat_restaurants_returned";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Route serving the exposition text.
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    /// Read `METRICS_ENABLED` (anything but "false" enables) and `METRICS_PATH`.
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|v| !v.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        let path = std::env::var("METRICS_PATH")
            .ok()
            .filter(|p| p.starts_with('/'))
            .unwrap_or_else(|| "/metrics".to_string());

        Self { enabled, path }
    }
}

/// Install the Prometheus recorder. Call once at startup.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }
    if PROMETHEUS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;
    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)
}

/// Handler for the metrics endpoint.
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_else(|| "# metrics recorder not installed\n".to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    Disabled,
    AlreadyInitialized,
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::Disabled => write!(f, "metrics are disabled"),
            MetricsError::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            MetricsError::InstallFailed(e) => write!(f, "failed to install metrics recorder: {}", e),
        }
    }
}

impl std::error::Error for MetricsError {}

/// Surface that served a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSurface {
    Json,
    Stream,
}

impl SearchSurface {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchSurface::Json => "json",
            SearchSurface::Stream => "sse",
        }
    }
}

/// Count a search request and, on success, how many restaurants it returned.
pub fn record_search(surface: SearchSurface, restaurants: Option<usize>) {
    metrics::counter!(SEARCHES_TOTAL, "surface" => surface.as_str()).increment(1);
    if let Some(count) = restaurants {
        metrics::histogram!(RESTAURANTS_RETURNED, "surface" => surface.as_str())
            .record(count as f64);
    }
}

pub fn record_search_failed(surface: SearchSurface, reason: FailureKind) {
    count_failure(surface, reason.as_str());
}

/// Count a search rejected before it reached the finder.
pub fn record_search_rejected(surface: SearchSurface) {
    record_search(surface, None);
    count_failure(surface, "invalid_request");
}

fn count_failure(surface: SearchSurface, reason: &'static str) {
    metrics::counter!(
        SEARCHES_FAILED_TOTAL,
        "reason" => reason,
        "surface" => surface.as_str()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_config_default() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert_eq!(config.path, "/metrics");
    }

    #[test]
    fn test_disabled_config_is_rejected() {
        let config = MetricsConfig {
            enabled: false,
            ..MetricsConfig::default()
        };
        assert_eq!(init_metrics(&config), Err(MetricsError::Disabled));
    }

    #[tokio::test]
    async fn test_handler_without_recorder_renders_comment() {
        let output = metrics_handler().await;
        assert!(output.starts_with('#'));
    }

    #[test]
    fn test_search_helpers_do_not_panic_without_recorder() {
        record_search(SearchSurface::Json, Some(3));
        record_search(SearchSurface::Stream, None);
        record_search_failed(SearchSurface::Stream, FailureKind::UpstreamTimeout);
    }

    #[test]
    fn test_rejected_search_counts_as_failure() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_search_rejected(SearchSurface::Json);
        });

        let output = handle.render();
        assert!(output.contains(r#"maat_searches_total{surface="json"} 1"#));
        assert!(output.contains(
            r#"maat_searches_failed_total{reason="invalid_request",surface="json"} 1"#
        ));
    }

    #[test]
    fn test_surface_labels() {
        assert_eq!(SearchSurface::Json.as_str(), "json");
        assert_eq!(SearchSurface::Stream.as_str(), "sse");
    }

    #[test]
    fn test_metrics_error_display() {
        assert_eq!(MetricsError::Disabled.to_string(), "metrics are disabled");
        assert!(MetricsError::InstallFailed("boom".into())
            .to_string()
            .contains("boom"));
    }
}
