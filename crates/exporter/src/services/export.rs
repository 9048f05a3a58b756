//! Sequential multi-order fetch with skip-on-failure.
//!
//! Shared by the bulk route and the CLI. Every requested id is attempted in
//! order; ids that do not parse, fail to fetch or do not exist are recorded
//! and skipped.

use serde::Serialize;
use tracing::{info, instrument, warn};

use zedonk_core::{Order, OrderGid};

use crate::shopify::ShopifyClient;

/// An id that produced no order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedOrder {
    pub id: String,
    pub reason: String,
}

/// Outcome of a bulk fetch.
#[derive(Debug, Clone, Default)]
pub struct BulkExport {
    pub requested: usize,
    pub orders: Vec<Order>,
    pub failures: Vec<FailedOrder>,
}

/// Counts reported when nothing could be exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    pub requested: usize,
    pub successful: usize,
    pub failed: usize,
}

impl BulkExport {
    #[must_use]
    pub fn summary(&self) -> BulkSummary {
        BulkSummary {
            requested: self.requested,
            successful: self.orders.len(),
            failed: self.failures.len(),
        }
    }

    fn fail(&mut self, id: &str, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(order_id = id, reason = %reason, "Skipping order");
        self.failures.push(FailedOrder {
            id: id.to_string(),
            reason,
        });
    }
}

/// Split a comma-separated id list, dropping blank entries.
#[must_use]
pub fn split_ids(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .collect()
}

/// Fetch `ids` one after another, skipping any that fail.
#[instrument(skip(client, ids), fields(requested = ids.len()))]
pub async fn fetch_orders(client: &ShopifyClient, ids: &[&str]) -> BulkExport {
    let mut export = BulkExport {
        requested: ids.len(),
        ..BulkExport::default()
    };

    for &raw in ids {
        let gid = match OrderGid::parse(raw) {
            Ok(gid) => gid,
            Err(e) => {
                export.fail(raw, e.to_string());
                continue;
            }
        };

        match client.fetch_order(gid).await {
            Ok(Some(order)) => export.orders.push(order),
            Ok(None) => export.fail(raw, "Order not found"),
            Err(e) => export.fail(raw, e.to_string()),
        }
    }

    let summary = export.summary();
    info!(
        requested = summary.requested,
        successful = summary.successful,
        failed = summary.failed,
        "Bulk fetch completed"
    );

    export
}
