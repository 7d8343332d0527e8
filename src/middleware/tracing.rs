// ABOUTME: Request tracing middleware for correlation and structured logging
// ABOUTME: Propagates or generates request IDs and wraps each HTTP request in a span
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use http::HeaderValue;
use tracing::Instrument;
use uuid::Uuid;

use crate::logging::AppLogger;

/// Header carrying the request correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID wrapper inserted into request extensions by [`with_request_tracing`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Request ID taken from the incoming header or freshly generated
#[must_use]
pub fn request_id_from(request: &Request) -> String {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map_or_else(|| format!("req_{}", Uuid::new_v4().simple()), str::to_owned)
}

/// Create a tracing span for HTTP requests
pub fn create_request_span(method: &str, path: &str, request_id: &str) -> tracing::Span {
    tracing::info_span!(
        "http_request",
        method = %method,
        path = %path,
        request_id = %request_id,
        status_code = tracing::field::Empty,
        duration_ms = tracing::field::Empty,
    )
}

/// Axum middleware: span per request, access log line, and echoed request ID
///
/// Handlers read the same ID through the [`RequestId`] extension.
pub async fn with_request_tracing(mut request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_owned();
    let request_id = request_id_from(&request);
    let span = create_request_span(&method, &path, &request_id);
    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).instrument(span.clone()).await;

    let status = response.status().as_u16();
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    span.record("status_code", status);
    span.record("duration_ms", duration_ms);
    span.in_scope(|| AppLogger::log_api_request(&method, &path, status, duration_ms));

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
