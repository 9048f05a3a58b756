//! Zedonk exporter library.
//!
//! Serves Shopify orders as Zedonk CSV downloads for the admin action
//! extensions, and exposes the same fetch path to the CLI.
//!
//! # Security
//!
//! This crate holds a Shopify Admin API access token. Routes are read-only
//! and unauthenticated; bind to a private interface or put the service
//! behind the store's app proxy.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;

use std::time::Duration;

use axum::{
    Router,
    http::{Method, Request, Response, header},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

pub use config::{ApiMode, ConfigError, ExporterConfig, ShopifyConfig};
pub use error::AppError;
pub use shopify::{ShopifyClient, ShopifyError};
pub use state::AppState;

/// How long browsers may cache a CORS preflight.
const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

/// CORS for the admin extensions, which call from Shopify's origin.
#[must_use]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_DISPOSITION])
        .max_age(CORS_MAX_AGE)
}

/// Build the full application: routes, CORS, request tracing and Sentry.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::routes())
        .layer(cors_layer())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
