//! Shared HTTP infrastructure for the maat restaurant finder service.
//!
//! - [`AppState`]: the shared [`RestaurantFinder`](maat_lib::RestaurantFinder)
//! - [`health`]: liveness/readiness probes
//! - [`ProblemDetails`]: RFC 9457 error responses
//! - [`ServiceResponse`]: successful responses with content type
//! - [`metrics`]: Prometheus recorder and search metrics
//! - [`logging`]: structured JSON / text logging
//! - [`middleware`]: request IDs and HTTP metrics
//! - request bodies with validation, and caller IP extraction
//!
//! Handlers stay thin: parse, validate, call `maat-lib`, format.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  axum handler                                │
//! │  - parse JSON body / query string            │
//! │  - validate, extract client IP               │
//! │  - RestaurantFinder::search / ::stream       │
//! │  - ServiceResponse / ProblemDetails / SSE    │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Enable the `test-utils` feature to use [`test_utils`] from dependent
//! crates.

pub mod cors;
mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use cors::{cors_layer, cors_origin_from_env};
pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_search, record_search_failed, record_search_rejected,
    MetricsConfig, MetricsError, SearchSurface,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId};
pub use problem::{from_lib_error, problem_type, ProblemDetails, PROBLEM_INVALID_REQUEST};
pub use request::{
    client_ip, ClientIp, SearchRequestBody, StreamQuery, Validate, DEFAULT_STREAM_QUERY, MAX_TEXT_CHARS,
};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError};
