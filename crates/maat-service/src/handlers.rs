use std::convert::Infallible;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderName, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use maat_lib::{SearchEvent, SearchResult};
use maat_service_shared::{
    from_lib_error, record_search, record_search_failed, record_search_rejected, AppState,
    ClientIp, ProblemDetails, RequestId, SearchRequestBody, SearchSurface, ServiceResponse,
    StreamQuery, Validate,
};

pub const BANNER_MESSAGE: &str = "MCP Restaurant Finder API";

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Banner {
    pub message: String,
}

/// HTTP response - either success or RFC 9457 error.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Response {
    Success(ServiceResponse<SearchResult>),
    Error(ProblemDetails),
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        match self {
            Response::Success(data) => (StatusCode::OK, Json(data)).into_response(),
            Response::Error(problem) => problem.into_response(),
        }
    }
}

/// Handle GET / requests.
pub(crate) async fn root_handler() -> ServiceResponse<Banner> {
    ServiceResponse::new(Banner {
        message: BANNER_MESSAGE.to_string(),
    })
}

/// Handle POST /api/v1/search requests.
pub(crate) async fn search_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    ClientIp(client_ip): ClientIp,
    body: Result<Json<SearchRequestBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(request_id = %request_id, error = %rejection, "rejected search body");
            record_search_rejected(SearchSurface::Json);
            return Response::Error(ProblemDetails::bad_request(
                rejection.body_text(),
                request_id.as_str(),
            ));
        }
    };

    info!(
        request_id = %request_id,
        query = %body.query,
        has_context = body.context.is_some(),
        has_location = body.location.is_some(),
        "handling search request"
    );

    if let Err(problem) = body.validate(request_id.as_str()) {
        record_search_rejected(SearchSurface::Json);
        return Response::Error(*problem);
    }

    match state
        .finder()
        .search(&body.into_search_request(client_ip))
        .await
    {
        Ok(result) => {
            record_search(SearchSurface::Json, Some(result.restaurants.len()));
            info!(
                request_id = %request_id,
                city = %result.position.city,
                count = result.restaurants.len(),
                "search completed"
            );
            Response::Success(ServiceResponse::new(result))
        }
        Err(e) => {
            record_search(SearchSurface::Json, None);
            record_search_failed(SearchSurface::Json, e.kind());
            error!(request_id = %request_id, error = %e, kind = %e.kind().as_str(), "search failed");
            Response::Error(from_lib_error(&e, request_id.as_str()))
        }
    }
}

/// Handle GET /sse requests.
pub(crate) async fn sse_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    ClientIp(client_ip): ClientIp,
    Query(query): Query<StreamQuery>,
) -> axum::response::Response {
    info!(
        request_id = %request_id,
        query = %query.query_or_default(),
        "handling stream request"
    );

    if let Err(problem) = query.validate(request_id.as_str()) {
        record_search_rejected(SearchSurface::Stream);
        return problem.into_response();
    }

    let events = state
        .finder()
        .stream(query.into_search_request(client_ip));
    let sse = Sse::new(to_sse_events(events, request_id)).keep_alive(KeepAlive::default());

    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
            (X_ACCEL_BUFFERING, "no"),
        ],
        sse,
    )
        .into_response()
}

/// Encode each event as a `data:` line, recording the outcome on the
/// terminal event.
fn to_sse_events(
    events: impl Stream<Item = SearchEvent> + Send + 'static,
    request_id: RequestId,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    events.map(move |event| {
        match &event {
            SearchEvent::Complete { count, .. } => {
                record_search(SearchSurface::Stream, Some(*count));
                info!(request_id = %request_id, count, "stream completed");
            }
            SearchEvent::Error { kind, message, .. } => {
                record_search(SearchSurface::Stream, None);
                record_search_failed(SearchSurface::Stream, *kind);
                error!(request_id = %request_id, error = %message, kind = %kind.as_str(), "stream failed");
            }
            _ => {}
        }
        Ok(encode_event(&event))
    })
}

fn encode_event(event: &SearchEvent) -> Event {
    match serde_json::to_string(event) {
        Ok(json) => Event::default().data(json),
        Err(e) => {
            error!(error = %e, "failed to encode stream event");
            Event::default().data(r#"{"type":"error","message":"failed to encode event"}"#)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maat_lib::{Position, Restaurant};
    use maat_service_shared::test_utils::test_state;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn test_encode_location_event() {
        let event = SearchEvent::Location {
            data: Position::new(37.5, 127.0, "Seoul", "South Korea").unwrap(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "location");
        assert_eq!(json["data"]["city"], "Seoul");
        let _ = encode_event(&event);
    }

    #[tokio::test]
    async fn test_sse_events_pass_through_in_order() {
        let restaurant = Restaurant {
            name: "Pizza Hall".into(),
            address: "Seoul".into(),
            category: "음식점 > 양식 > 피자".into(),
            distance: 240.0,
            rating: Some(4.6),
        };
        let events = futures::stream::iter(vec![
            SearchEvent::Restaurant { data: restaurant },
            SearchEvent::Complete {
                message: "Streaming complete.".into(),
                count: 1,
            },
        ]);
        let encoded: Vec<_> = to_sse_events(events, RequestId("req-1".into()))
            .collect()
            .await;
        assert_eq!(encoded.len(), 2);
        assert!(encoded.iter().all(Result::is_ok));
    }

    #[tokio::test]
    async fn test_overlong_query_counts_as_failed_search() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let _guard = metrics::set_default_local_recorder(&recorder);

        let (state, fakes) = test_state();
        let body = SearchRequestBody {
            query: "가".repeat(501),
            ..SearchRequestBody::default()
        };
        let response = search_handler(
            State(state),
            RequestId("req-long".into()),
            ClientIp(None),
            Ok(Json(body)),
        )
        .await;

        assert!(matches!(response, Response::Error(_)));
        assert!(fakes.places.calls().is_empty());
        let output = handle.render();
        assert!(output.contains(r#"maat_searches_total{surface="json"} 1"#));
        assert!(output.contains(
            r#"maat_searches_failed_total{reason="invalid_request",surface="json"} 1"#
        ));
    }
}
