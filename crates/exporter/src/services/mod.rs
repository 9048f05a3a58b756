//! Business logic services for the exporter.
//!
//! # Services
//!
//! - `export` - Sequential multi-order fetch shared by the bulk route and CLI

pub mod export;

pub use export::{BulkExport, BulkSummary, FailedOrder, fetch_orders, split_ids};
