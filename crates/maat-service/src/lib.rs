//! Nearby restaurant finder HTTP service.
//!
//! Exposes the [`RestaurantFinder`](maat_lib::RestaurantFinder) pipeline over
//! HTTP, both as a single JSON response and as a Server-Sent Events stream.
//!
//! # Endpoints
//!
//! - `GET /` - Service banner
//! - `POST /api/v1/search` - Search and return the aggregate result
//! - `GET /sse?query=&context=` - Stream the location, each restaurant, then `complete`
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe (requires `KAKAO_API_KEY`)
//!
//! # Configuration
//!
//! - `KAKAO_API_KEY`, `IPLOCATION_API_KEY` and the `MAAT_*` search settings
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//! - `SERVICE_PORT` - HTTP port (default: 8000)
//! - `METRICS_ENABLED`, `METRICS_PATH`
//! - `CORS_ALLOW_ORIGIN` - Comma-separated origins (default: `*`)

use std::env;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use maat_service_shared::{
    cors_layer, cors_origin_from_env, health_live, health_ready, metrics_handler, AppState,
    MetricsConfig, MetricsLayer,
};

mod handlers;

pub use handlers::{Banner, BANNER_MESSAGE};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8000;

/// Settings of the HTTP surface itself; search settings live in
/// [`FinderConfig`](maat_lib::FinderConfig).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub metrics: MetricsConfig,
    pub cors_allow_origin: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            metrics: MetricsConfig::default(),
            cors_allow_origin: "*".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let port = env::var("SERVICE_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            port,
            metrics: MetricsConfig::from_env(),
            cors_allow_origin: cors_origin_from_env(),
        }
    }
}

/// Build the router with every endpoint and layer attached.
pub fn app(state: AppState, config: &ServiceConfig) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::root_handler))
        .route("/api/v1/search", post(handlers::search_handler))
        .route("/sse", get(handlers::sse_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready));

    if config.metrics.enabled {
        router = router.route(&config.metrics.path, get(metrics_handler));
    }

    router
        .layer(MetricsLayer)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_allow_origin))
        .with_state(state)
}
