//! HTTP route handlers for the exporter.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//!
//! # Export (CSV attachments)
//! GET  /api/order/{id}         - One order, id numeric or gid://shopify/Order/N
//! GET  /api/orders?ids=a,b,c   - Several orders in one file
//! ```
//!
//! `HEAD` is served by the `GET` handlers with the body stripped, and CORS
//! preflights are answered by the layer installed in [`crate::app`].

pub mod export;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Build the export router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/order", get(export::missing_order_id))
        .route("/api/order/", get(export::missing_order_id))
        .route("/api/order/{id}", get(export::export_order))
        .route("/api/orders", get(export::export_orders_bulk))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not call Shopify.
async fn health() -> &'static str {
    "ok"
}
