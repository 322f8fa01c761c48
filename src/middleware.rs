//! Request tracing middleware for observability.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use std::time::{Duration, Instant};
use tracing::{info, Instrument};
use uuid::Uuid;

/// Request ID header name for distributed tracing
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that tags every request with an id, logs completion, and records metrics.
///
/// An incoming `x-request-id` header is reused; otherwise a UUID v4 is generated.
/// Handler logs inherit the id through the request span and the id is echoed in the response header.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        uri = %path,
    );

    let start = Instant::now();

    async move {
        let mut response = next.run(request).await;
        let duration = start.elapsed();
        let status = response.status().as_u16();

        info!(
            duration_ms = duration.as_millis() as u64,
            status = status,
            method = %method,
            path = %path,
            "request completed"
        );

        record_request_metrics(&method, &path, status, duration);

        response.headers_mut().insert(
            REQUEST_ID_HEADER,
            HeaderValue::from_str(&request_id)
                .unwrap_or_else(|_| HeaderValue::from_static("unknown")),
        );
        response
    }
    .instrument(span)
    .await
}

fn record_request_metrics(method: &str, path: &str, status: u16, duration: Duration) {
    let status_str = status.to_string();
    let path = normalize_path(path);

    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.clone(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path,
        "status" => status_str
    )
    .record(duration.as_secs_f64());
}

/// Collapse session ids so metric label cardinality stays bounded.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if Uuid::parse_str(segment).is_ok() {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
