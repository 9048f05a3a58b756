//! Admin GraphQL order query and its conversion into the core order model.
//!
//! The query is written out by hand and wired up through
//! [`graphql_client::GraphQLQuery`], the same trait the derive macro
//! generates, so [`super::ShopifyClient`] can execute it generically.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

use zedonk_core::{
    Attribute, LineItem, Metafield, Order, PersonName, Product, SelectedOption, parse_amount,
};

/// Line items fetched per order. Orders with more lines are truncated.
pub const LINE_ITEM_LIMIT: usize = 100;

const GET_ORDER_FOR_EXPORT: &str = r"
query GetOrderForExport($id: ID!) {
  order(id: $id) {
    name
    note
    tags
    currencyCode
    customAttributes { key value }
    customer { firstName lastName }
    shippingAddress { name }
    billingAddress { name }
    lineItems(first: 100) {
      edges {
        node {
          title
          quantity
          sku
          variantTitle
          originalUnitPriceSet { shopMoney { amount } }
          discountedUnitPriceSet { shopMoney { amount } }
          variant {
            sku
            barcode
            title
            selectedOptions { name value }
            metafields(first: 20) { edges { node { namespace key value } } }
          }
          product {
            title
            productType
            vendor
            tags
            metafields(first: 20) { edges { node { namespace key value } } }
          }
        }
      }
    }
  }
}
";

/// `order(id:)` with everything the CSV needs.
pub struct GetOrderForExport;

impl GraphQLQuery for GetOrderForExport {
    type Variables = Variables;
    type ResponseData = ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: GET_ORDER_FOR_EXPORT,
            operation_name: "GetOrderForExport",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Variables {
    /// Full order GID (`gid://shopify/Order/N`).
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseData {
    pub order: Option<GqlOrder>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlOrder {
    pub name: String,
    pub note: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub currency_code: Option<String>,
    #[serde(default)]
    pub custom_attributes: Vec<GqlAttribute>,
    pub customer: Option<GqlCustomer>,
    pub shipping_address: Option<GqlAddress>,
    pub billing_address: Option<GqlAddress>,
    pub line_items: Connection<GqlLineItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GqlAttribute {
    pub key: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlCustomer {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GqlAddress {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Connection<T> {
    #[serde(default)]
    pub edges: Vec<Edge<T>>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { edges: Vec::new() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlLineItem {
    pub title: String,
    pub quantity: i64,
    pub sku: Option<String>,
    pub variant_title: Option<String>,
    pub original_unit_price_set: Option<MoneyBag>,
    pub discounted_unit_price_set: Option<MoneyBag>,
    pub variant: Option<GqlVariant>,
    pub product: Option<GqlProduct>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyBag {
    pub shop_money: MoneyV2,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoneyV2 {
    pub amount: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlVariant {
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub selected_options: Vec<GqlSelectedOption>,
    #[serde(default)]
    pub metafields: Connection<GqlMetafield>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GqlSelectedOption {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlProduct {
    pub title: String,
    pub product_type: Option<String>,
    pub vendor: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metafields: Connection<GqlMetafield>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GqlMetafield {
    pub namespace: String,
    pub key: String,
    pub value: String,
}

// =============================================================================
// Conversions
// =============================================================================

/// Convert the `order` payload into the core model.
pub fn convert_order(order: GqlOrder) -> Order {
    Order {
        name: order.name,
        note: order.note,
        tags: order.tags,
        custom_attributes: order
            .custom_attributes
            .into_iter()
            .map(|a| Attribute {
                key: a.key,
                value: a.value,
            })
            .collect(),
        customer: order.customer.map(|c| PersonName {
            first_name: c.first_name,
            last_name: c.last_name,
        }),
        shipping_name: order.shipping_address.and_then(|a| a.name),
        billing_name: order.billing_address.and_then(|a| a.name),
        currency_code: order.currency_code,
        line_items: order
            .line_items
            .edges
            .into_iter()
            .map(|e| convert_line_item(e.node))
            .collect(),
    }
}

fn convert_line_item(item: GqlLineItem) -> LineItem {
    let unit_price = item
        .original_unit_price_set
        .and_then(|m| parse_amount(&m.shop_money.amount));
    let discounted_unit_price = item
        .discounted_unit_price_set
        .and_then(|m| parse_amount(&m.shop_money.amount));

    let mut line = LineItem {
        title: item.title,
        quantity: item.quantity,
        sku: item.sku,
        variant_title: item.variant_title,
        unit_price,
        discounted_unit_price,
        product: item.product.map(convert_product),
        ..LineItem::default()
    };

    // Variant SKU is authoritative; the line SKU is a snapshot from checkout.
    if let Some(variant) = item.variant {
        if variant.sku.as_deref().is_some_and(|s| !s.trim().is_empty()) {
            line.sku = variant.sku;
        }
        line.barcode = variant.barcode;
        if line.variant_title.is_none() {
            line.variant_title = variant.title;
        }
        line.selected_options = variant
            .selected_options
            .into_iter()
            .map(|o| SelectedOption::new(o.name, o.value))
            .collect();
        line.variant_metafields = convert_metafields(variant.metafields);
    }

    line
}

fn convert_product(product: GqlProduct) -> Product {
    Product {
        title: product.title,
        product_type: product.product_type,
        vendor: product.vendor,
        tags: product.tags,
        metafields: convert_metafields(product.metafields),
    }
}

fn convert_metafields(connection: Connection<GqlMetafield>) -> Vec<Metafield> {
    connection
        .edges
        .into_iter()
        .map(|e| Metafield::new(e.node.namespace, e.node.key, e.node.value))
        .collect()
}
