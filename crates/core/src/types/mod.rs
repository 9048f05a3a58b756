//! Core types for Zedonk exports.
//!
//! This module provides the order model shared by every fetch path.

pub mod gid;
pub mod order;
pub mod price;

pub use gid::{GidError, OrderGid};
pub use order::{
    Attribute, LineItem, Metafield, Order, PersonName, Product, SelectedOption, find_metafield,
};
pub use price::{format_amount, parse_amount};
