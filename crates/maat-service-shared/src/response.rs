//! Response wrapper for successful HTTP responses.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Successful payload plus a `content_type` field, mirroring
/// [`ProblemDetails`](crate::ProblemDetails) on the error path.
///
/// The payload fields are flattened into the top-level object:
///
/// ```
/// use maat_service_shared::ServiceResponse;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Banner {
///     message: &'static str,
/// }
///
/// let response = ServiceResponse::new(Banner { message: "hello" });
/// let json = serde_json::to_string(&response).unwrap();
/// assert!(json.contains("\"message\":\"hello\""));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    #[serde(flatten)]
    pub data: T,

    pub content_type: String,
}

impl<T> ServiceResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            content_type: "application/json".to_string(),
        }
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
