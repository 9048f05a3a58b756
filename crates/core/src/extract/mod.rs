//! Field extraction heuristics.
//!
//! Everything here is a pure function of an [`Order`](crate::types::Order)
//! or [`LineItem`](crate::types::LineItem).

pub mod customer;
pub mod line;
pub mod note;
pub mod style;

pub use customer::{CustomerInfo, extract_customer_info};
pub use line::{LineFields, extract_line_fields};
pub use note::repair_mojibake;
pub use style::{fabric_from_style, style_from_code};
