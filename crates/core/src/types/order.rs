//! Source-neutral order model.
//!
//! Both the GraphQL and REST clients convert their payloads into these types
//! so the extraction rules only ever see one shape.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A key/value pair attached to an order (Shopify "custom attributes" in
/// GraphQL, "note attributes" in REST).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: Option<String>,
}

impl Attribute {
    /// Build an attribute with a value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }
}

/// A product option selected on a variant (e.g. `Size = M`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

impl SelectedOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A metafield on a product or variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metafield {
    pub namespace: String,
    pub key: String,
    pub value: String,
}

impl Metafield {
    pub fn new(
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Find the first metafield matching any `(namespace, key)` pair, in order.
///
/// Blank values are treated as absent.
#[must_use]
pub fn find_metafield<'a>(fields: &'a [Metafield], keys: &[(&str, &str)]) -> Option<&'a str> {
    keys.iter().find_map(|(namespace, key)| {
        fields
            .iter()
            .find(|m| m.namespace == *namespace && m.key == *key)
            .map(|m| m.value.trim())
            .filter(|v| !v.is_empty())
    })
}

/// First and last name of the order's customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl PersonName {
    /// `"First Last"`, trimmed. Empty when both parts are missing.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }
}

/// The product a line item was bought from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub product_type: Option<String>,
    pub vendor: Option<String>,
    pub tags: Vec<String>,
    pub metafields: Vec<Metafield>,
}

/// One line of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub title: String,
    pub quantity: i64,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    /// Variant title, e.g. `"M / Black"` or `"Default Title"`.
    pub variant_title: Option<String>,
    pub selected_options: Vec<SelectedOption>,
    pub variant_metafields: Vec<Metafield>,
    /// Price per unit before discounts.
    pub unit_price: Option<Decimal>,
    /// Price per unit after line-level discounts.
    pub discounted_unit_price: Option<Decimal>,
    pub product: Option<Product>,
}

/// An order as fetched from the Admin API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order reference shown to merchants, e.g. `#1001`.
    pub name: String,
    pub note: Option<String>,
    pub tags: Vec<String>,
    pub custom_attributes: Vec<Attribute>,
    pub customer: Option<PersonName>,
    pub shipping_name: Option<String>,
    pub billing_name: Option<String>,
    /// ISO 4217 currency code of the order.
    pub currency_code: Option<String>,
    pub line_items: Vec<LineItem>,
}
