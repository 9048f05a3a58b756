//! CSV export handlers.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use zedonk_core::{OrderGid, export_orders};

use crate::{
    error::AppError,
    services::{fetch_orders, split_ids},
    state::AppState,
};

/// `Content-Type` of every CSV response.
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Query string for the bulk export.
#[derive(Debug, Deserialize)]
pub struct BulkExportQuery {
    /// Comma-separated order ids (numeric or GIDs).
    pub ids: Option<String>,
}

/// Download name for a single order.
#[must_use]
pub fn single_filename(id: OrderGid) -> String {
    format!("zedonk_order_{}.csv", id.numeric())
}

/// Download name for a bulk export of `count` orders on `date`.
#[must_use]
pub fn bulk_filename(count: usize, date: NaiveDate) -> String {
    format!("zedonk_orders_{count}_{}.csv", date.format("%Y-%m-%d"))
}

fn csv_attachment(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        body,
    )
        .into_response()
}

/// `/api/order` with no id segment.
pub async fn missing_order_id() -> AppError {
    AppError::bad_request("Order ID is required", None)
}

/// Export a single order.
#[instrument(skip(state))]
pub async fn export_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    if id.trim().is_empty() {
        return Err(AppError::bad_request("Order ID is required", None));
    }

    let gid = OrderGid::parse(&id)
        .map_err(|e| AppError::bad_request("Invalid order ID", json!(e.to_string())))?;

    let order = state
        .shopify()
        .fetch_order(gid)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found", json!(gid.to_gid())))?;

    let csv = export_orders(std::slice::from_ref(&order), state.layout())?;

    info!(
        order_id = %gid,
        name = %order.name,
        line_items = order.line_items.len(),
        "Exported order"
    );

    Ok(csv_attachment(&single_filename(gid), csv))
}

/// Export several orders into one CSV, skipping any that fail.
#[instrument(skip(state, query))]
pub async fn export_orders_bulk(
    State(state): State<AppState>,
    Query(query): Query<BulkExportQuery>,
) -> Result<Response, AppError> {
    let raw = query.ids.unwrap_or_default();
    let ids = split_ids(&raw);
    if ids.is_empty() {
        return Err(AppError::bad_request("Order IDs are required", None));
    }

    let export = fetch_orders(state.shopify(), &ids).await;
    if export.orders.is_empty() {
        return Err(AppError::not_found(
            "No orders found",
            json!(export.summary()),
        ));
    }

    let csv = export_orders(&export.orders, state.layout())?;
    let filename = bulk_filename(export.orders.len(), Utc::now().date_naive());

    info!(
        requested = export.requested,
        exported = export.orders.len(),
        skipped = export.failures.len(),
        filename = %filename,
        "Exported orders"
    );

    Ok(csv_attachment(&filename, csv))
}
