//! Zedonk Core - order model and CSV transformation.
//!
//! This crate turns Shopify orders into the CSV layout imported by Zedonk.
//! It is used by:
//! - `exporter` - HTTP service called from the Shopify admin extension
//! - `cli` - command-line exports
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. The Shopify clients convert their payloads into [`types::Order`]
//! and everything after that happens here.
//!
//! # Modules
//!
//! - [`types`] - Order model, order GIDs, money helpers
//! - [`extract`] - Customer, style/fabric and line field heuristics
//! - [`export`] - Row projection and CSV serialization

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod export;
pub mod extract;
pub mod types;

pub use export::{CsvRow, ExportError, ExportLayout, export_orders, rows_for_order, write_csv};
pub use types::*;
