//! Request types, validation and caller-address extraction.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use maat_lib::{Coordinates, SearchRequest};

use crate::ProblemDetails;

/// Default query of the streaming endpoint ("recommend restaurants around me").
pub const DEFAULT_STREAM_QUERY: &str = "주변 맛집 추천해줘";

/// Longest accepted query or context, in characters.
pub const MAX_TEXT_CHARS: usize = 500;

/// Validation for request types.
///
/// Returns a boxed `ProblemDetails` to keep the `Err` variant small.
pub trait Validate {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Body of `POST /api/v1/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequestBody {
    /// Free-text query; may be empty.
    #[serde(default)]
    pub query: String,

    /// Prior conversation; takes precedence over the query when matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Explicit search position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
}

impl SearchRequestBody {
    pub fn into_search_request(self, client_ip: Option<String>) -> SearchRequest {
        SearchRequest::new(self.query)
            .with_context(self.context)
            .with_coordinates(self.location)
            .with_client_ip(client_ip)
    }
}

impl Validate for SearchRequestBody {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        check_length("query", &self.query, request_id)?;
        if let Some(context) = &self.context {
            check_length("context", context, request_id)?;
        }
        Ok(())
    }
}

/// Query string of `GET /sse`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamQuery {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

impl StreamQuery {
    /// The query, falling back to [`DEFAULT_STREAM_QUERY`] when absent.
    pub fn query_or_default(&self) -> &str {
        self.query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .unwrap_or(DEFAULT_STREAM_QUERY)
    }

    pub fn into_search_request(self, client_ip: Option<String>) -> SearchRequest {
        SearchRequest::new(self.query_or_default())
            .with_context(self.context)
            .with_client_ip(client_ip)
    }
}

impl Validate for StreamQuery {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        check_length("query", self.query_or_default(), request_id)?;
        if let Some(context) = &self.context {
            check_length("context", context, request_id)?;
        }
        Ok(())
    }
}

fn check_length(field: &str, value: &str, request_id: &str) -> Result<(), Box<ProblemDetails>> {
    if value.chars().count() > MAX_TEXT_CHARS {
        return Err(Box::new(ProblemDetails::bad_request(
            format!(
                "The '{}' field must be at most {} characters",
                field, MAX_TEXT_CHARS
            ),
            request_id,
        )));
    }
    Ok(())
}

/// Extractor for the caller's public IP address, see [`client_ip`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(ClientIp(client_ip(&parts.headers, peer)))
    }
}

/// Determine the caller's public IP address.
///
/// Checks the first `X-Forwarded-For` entry, then `X-Real-IP`, then the
/// socket peer. Loopback, private, link-local and unspecified addresses are
/// discarded so the geolocation provider can infer the address itself.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    forwarded
        .or_else(real_ip)
        .or(peer.map(|p| p.ip()))
        .filter(is_public)
        .map(|ip| ip.to_string())
}

fn is_public(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => {
            let segments = v6.segments();
            let unique_local = (segments[0] & 0xfe00) == 0xfc00;
            let link_local = (segments[0] & 0xffc0) == 0xfe80;
            !(v6.is_loopback() || v6.is_unspecified() || unique_local || link_local)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_search_body_defaults() {
        let body: SearchRequestBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.query, "");
        assert!(body.context.is_none());
        assert!(body.location.is_none());
        assert!(body.validate("req").is_ok());
    }

    #[test]
    fn test_search_body_with_location() {
        let body: SearchRequestBody = serde_json::from_str(
            r#"{"query":"pizza","location":{"latitude":37.5,"longitude":127.0}}"#,
        )
        .unwrap();
        let request = body.into_search_request(Some("1.2.3.4".into()));
        assert_eq!(request.coordinates.map(|c| c.latitude), Some(37.5));
        assert_eq!(request.client_ip.as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn test_overlong_query_rejected() {
        let body = SearchRequestBody {
            query: "가".repeat(MAX_TEXT_CHARS + 1),
            ..SearchRequestBody::default()
        };
        let problem = body.validate("req-long").unwrap_err();
        assert_eq!(problem.status, 400);
        assert_eq!(problem.instance.as_deref(), Some("req-long"));
    }

    #[test]
    fn test_stream_query_default() {
        let query = StreamQuery::default();
        assert_eq!(query.query_or_default(), DEFAULT_STREAM_QUERY);

        let blank = StreamQuery {
            query: Some("  ".into()),
            context: None,
        };
        assert_eq!(blank.query_or_default(), DEFAULT_STREAM_QUERY);
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let h = headers(&[
            ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
            ("x-real-ip", "198.51.100.2"),
        ]);
        let peer: SocketAddr = "8.8.8.8:5000".parse().unwrap();
        assert_eq!(client_ip(&h, Some(peer)).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip_then_peer() {
        let h = headers(&[("x-real-ip", "198.51.100.2")]);
        assert_eq!(client_ip(&h, None).as_deref(), Some("198.51.100.2"));

        let peer: SocketAddr = "8.8.4.4:443".parse().unwrap();
        assert_eq!(
            client_ip(&HeaderMap::new(), Some(peer)).as_deref(),
            Some("8.8.4.4")
        );
    }

    #[test]
    fn test_private_addresses_are_discarded() {
        let peer: SocketAddr = "127.0.0.1:8000".parse().unwrap();
        assert_eq!(client_ip(&HeaderMap::new(), Some(peer)), None);

        let h = headers(&[("x-forwarded-for", "192.168.1.10")]);
        assert_eq!(client_ip(&h, None), None);

        let v6: SocketAddr = "[::1]:8000".parse().unwrap();
        assert_eq!(client_ip(&HeaderMap::new(), Some(v6)), None);
    }
}
