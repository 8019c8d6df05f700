//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Every library failure kind has its own problem type URI under
//! `/problems/`. See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use maat_lib::{Error as LibError, FailureKind};

/// Problem type URI for malformed request bodies or parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for a library failure kind.
pub fn problem_type(kind: FailureKind) -> String {
    format!("/problems/{}", kind.as_str().replace('_', "-"))
}

fn problem_title(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::InvalidCoordinates => "Invalid Coordinates",
        FailureKind::LocationNotFound => "Location Not Found",
        FailureKind::LocationUnavailable => "Location Unavailable",
        FailureKind::UpstreamTimeout => "Upstream Timeout",
        FailureKind::SearchFailed => "Search Failed",
        FailureKind::NoResults => "No Results",
        FailureKind::ConfigurationMissing => "Configuration Missing",
        FailureKind::Internal => "Internal Error",
    }
}

/// RFC 9457 Problem Details response structure.
///
/// # Example
///
/// ```
/// use maat_service_shared::{ProblemDetails, PROBLEM_INVALID_REQUEST};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(
///     PROBLEM_INVALID_REQUEST,
///     "Invalid Request",
///     StatusCode::BAD_REQUEST,
/// )
/// .with_detail("query string is not valid UTF-8")
/// .with_request_id("req-12345");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    pub title: String,

    pub status: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Request ID of the failing request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Machine-readable failure kind, when the problem came from a search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,

    /// Always "application/problem+json".
    pub content_type: String,
}

impl ProblemDetails {
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            kind: None,
            content_type: "application/problem+json".to_string(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// 400 Bad Request for input the handler could not accept.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.title,
            self.detail.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = (status, Json(&self)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}

/// Convert a library error to ProblemDetails.
///
/// The status follows the failure kind; the detail is the error's own
/// message.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    let kind = error.kind();
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut problem = ProblemDetails::new(problem_type(kind), problem_title(kind), status)
        .with_detail(error.to_string())
        .with_request_id(request_id);
    problem.kind = Some(kind);
    problem
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_details_new() {
        let problem = ProblemDetails::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        );
        assert_eq!(problem.type_uri, PROBLEM_INVALID_REQUEST);
        assert_eq!(problem.status, 400);
        assert!(problem.kind.is_none());
        assert_eq!(problem.content_type, "application/problem+json");
    }

    #[test]
    fn test_problem_details_bad_request() {
        let problem = ProblemDetails::bad_request("Invalid JSON", "req-123");
        assert_eq!(problem.status, 400);
        assert_eq!(problem.instance.as_deref(), Some("req-123"));
    }

    #[test]
    fn test_problem_type_uses_kebab_case() {
        assert_eq!(
            problem_type(FailureKind::LocationNotFound),
            "/problems/location-not-found"
        );
        assert_eq!(problem_type(FailureKind::NoResults), "/problems/no-results");
    }

    #[test]
    fn test_from_lib_error_statuses() {
        let cases = [
            (
                LibError::InvalidCoordinates {
                    latitude: 100.0,
                    longitude: 0.0,
                },
                400,
            ),
            (LibError::LocationNotFound { name: "x".into() }, 404),
            (LibError::no_results("맛집"), 404),
            (
                LibError::UpstreamTimeout {
                    service: "kakao".into(),
                },
                504,
            ),
            (
                LibError::SearchFailed {
                    message: "boom".into(),
                },
                502,
            ),
            (
                LibError::ConfigurationMissing {
                    name: "KAKAO_API_KEY".into(),
                },
                500,
            ),
        ];

        for (error, status) in cases {
            let problem = from_lib_error(&error, "req-lib");
            assert_eq!(problem.status, status, "{error}");
            assert_eq!(problem.kind, Some(error.kind()));
            assert_eq!(problem.detail.as_deref(), Some(error.to_string().as_str()));
        }
    }

    #[test]
    fn test_problem_details_serialization() {
        let problem = from_lib_error(&LibError::no_results("라멘 맛집"), "req-test");
        let json = serde_json::to_value(&problem).unwrap();

        assert_eq!(json["type"], "/problems/no-results");
        assert_eq!(json["title"], "No Results");
        assert_eq!(json["status"], 404);
        assert_eq!(json["kind"], "no_results");
        assert_eq!(json["instance"], "req-test");
    }
}
