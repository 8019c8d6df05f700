//! CORS policy for browser clients of the JSON and SSE endpoints.

use std::time::Duration;

use http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Preflight cache lifetime.
pub const CORS_MAX_AGE: Duration = Duration::from_secs(3600);

/// Build the CORS layer from a comma-separated origin list.
///
/// `*` (the default) allows any origin. Entries that are not valid header
/// values are skipped; if none survive, any origin is allowed.
pub fn cors_layer(allow_origin: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any)
        .max_age(CORS_MAX_AGE);

    let origins: Vec<HeaderValue> = allow_origin
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "*")
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    if origins.is_empty() || allow_origin.split(',').any(|o| o.trim() == "*") {
        base.allow_origin(Any)
    } else {
        base.allow_origin(AllowOrigin::list(origins))
    }
}

/// Origins from `CORS_ALLOW_ORIGIN`, defaulting to `*`.
pub fn cors_origin_from_env() -> String {
    std::env::var("CORS_ALLOW_ORIGIN").unwrap_or_else(|_| "*".to_string())
}
