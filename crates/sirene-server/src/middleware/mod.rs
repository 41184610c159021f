//! Middleware for the Sirene server
//!
//! This module provides middleware for:
//! - CORS restricted to a single trusted origin
//! - Request logging with tracing
//! - Turning handler panics into JSON 500 responses

use std::{any::Any, time::Duration};

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{AllowOrigin, Any as AnyValue, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{api::response::ErrorResponse, config::CorsConfig};

/// Create CORS layer from configuration
///
/// Only the configured origin is echoed back; requests from any other origin
/// get no CORS headers and are rejected by the browser.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let allowed = config.allowed_origin.trim().to_string();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _request| origin.as_bytes() == allowed.as_bytes(),
        ))
        .allow_methods(AnyValue)
        .allow_headers(AnyValue)
        .max_age(Duration::from_secs(3600))
}

/// Create tracing/logging layer
pub fn tracing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(tower_http::LatencyUnit::Micros),
        )
}

/// Response for a panicking handler, used with `CatchPanicLayer::custom`
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %detail, "Request handler panicked");

    let error = ErrorResponse::new("INTERNAL_ERROR", "An unexpected error occurred");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
}
