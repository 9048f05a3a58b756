//! Admin REST payloads (`orders/{id}.json`, `products/{id}.json`).
//!
//! REST orders do not embed products, so conversion takes the products the
//! client fetched separately, keyed by product id.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use zedonk_core::{Attribute, LineItem, Order, PersonName, Product, SelectedOption, parse_amount};

#[derive(Debug, Clone, Deserialize)]
pub struct OrderEnvelope {
    pub order: RestOrder,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductEnvelope {
    pub product: RestProduct,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestOrder {
    pub name: String,
    pub note: Option<String>,
    #[serde(default)]
    pub tags: String,
    pub currency: Option<String>,
    #[serde(default)]
    pub note_attributes: Vec<NoteAttribute>,
    pub customer: Option<RestCustomer>,
    pub shipping_address: Option<RestAddress>,
    pub billing_address: Option<RestAddress>,
    #[serde(default)]
    pub line_items: Vec<RestLineItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoteAttribute {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestCustomer {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestAddress {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestLineItem {
    pub title: String,
    pub quantity: i64,
    pub sku: Option<String>,
    pub variant_id: Option<u64>,
    pub variant_title: Option<String>,
    pub product_id: Option<u64>,
    pub price: Option<String>,
    pub total_discount: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestProduct {
    pub id: u64,
    pub title: String,
    pub product_type: Option<String>,
    pub vendor: Option<String>,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub options: Vec<RestProductOption>,
    #[serde(default)]
    pub variants: Vec<RestVariant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestProductOption {
    pub name: String,
    pub position: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestVariant {
    pub id: u64,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub option1: Option<String>,
    pub option2: Option<String>,
    pub option3: Option<String>,
}

impl RestOrder {
    /// Distinct product ids in line order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<u64> {
        let mut ids = Vec::new();
        for id in self.line_items.iter().filter_map(|l| l.product_id) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

impl RestVariant {
    fn option(&self, position: usize) -> Option<&str> {
        match position {
            1 => self.option1.as_deref(),
            2 => self.option2.as_deref(),
            3 => self.option3.as_deref(),
            _ => None,
        }
    }
}

/// Split a REST comma-separated tag string.
fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Convert a REST order plus its products into the core model.
#[must_use]
pub fn convert_order(order: RestOrder, products: &HashMap<u64, RestProduct>) -> Order {
    Order {
        name: order.name,
        note: order.note,
        tags: split_tags(&order.tags),
        custom_attributes: order
            .note_attributes
            .into_iter()
            .map(|a| Attribute {
                key: a.name,
                value: a.value,
            })
            .collect(),
        customer: order.customer.map(|c| PersonName {
            first_name: c.first_name,
            last_name: c.last_name,
        }),
        shipping_name: order.shipping_address.and_then(|a| a.name),
        billing_name: order.billing_address.and_then(|a| a.name),
        currency_code: order.currency,
        line_items: order
            .line_items
            .into_iter()
            .map(|l| convert_line_item(l, products))
            .collect(),
    }
}

fn convert_line_item(item: RestLineItem, products: &HashMap<u64, RestProduct>) -> LineItem {
    let unit_price = item.price.as_deref().and_then(parse_amount);
    let discounted_unit_price = unit_price.map(|price| {
        let discount = item
            .total_discount
            .as_deref()
            .and_then(parse_amount)
            .unwrap_or_default();
        if item.quantity > 0 && !discount.is_zero() {
            price - discount / Decimal::from(item.quantity)
        } else {
            price
        }
    });

    let product = item.product_id.and_then(|id| products.get(&id));
    let variant = product.and_then(|p| {
        item.variant_id
            .and_then(|vid| p.variants.iter().find(|v| v.id == vid))
    });

    let sku = item
        .sku
        .filter(|s| !s.trim().is_empty())
        .or_else(|| variant.and_then(|v| v.sku.clone()));

    LineItem {
        title: item.title,
        quantity: item.quantity,
        sku,
        barcode: variant.and_then(|v| v.barcode.clone()),
        variant_title: item.variant_title,
        selected_options: product
            .zip(variant)
            .map(|(p, v)| selected_options(p, v))
            .unwrap_or_default(),
        variant_metafields: Vec::new(),
        unit_price,
        discounted_unit_price,
        product: product.map(convert_product),
    }
}

/// Pair product option names with the variant's positional values.
fn selected_options(product: &RestProduct, variant: &RestVariant) -> Vec<SelectedOption> {
    product
        .options
        .iter()
        .filter_map(|o| {
            variant
                .option(o.position)
                .map(|value| SelectedOption::new(o.name.clone(), value))
        })
        .collect()
}

fn convert_product(product: &RestProduct) -> Product {
    Product {
        title: product.title.clone(),
        product_type: product.product_type.clone(),
        vendor: product.vendor.clone(),
        tags: split_tags(&product.tags),
        metafields: Vec::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ORDER_JSON: &str = r##"{
        "order": {
            "id": 5512345678901,
            "name": "#1001",
            "note": null,
            "tags": "wholesale, customer:Maison Kim, ",
            "currency": "KRW",
            "note_attributes": [{"name": "Account Code", "value": "3001"}],
            "customer": {"first_name": "Min", "last_name": "Kim"},
            "shipping_address": {"name": "Warehouse"},
            "billing_address": {"name": "Accounts"},
            "line_items": [
                {
                    "title": "Jacket",
                    "quantity": 4,
                    "sku": "AB24JKBKM",
                    "variant_id": 11,
                    "variant_title": "M / Black",
                    "product_id": 7,
                    "price": "250.00",
                    "total_discount": "100.00"
                },
                {
                    "title": "Jacket",
                    "quantity": 1,
                    "sku": "",
                    "variant_id": 12,
                    "variant_title": "L / Black",
                    "product_id": 7,
                    "price": "250.00",
                    "total_discount": "0.00"
                },
                {
                    "title": "Custom fee",
                    "quantity": 1,
                    "sku": null,
                    "variant_id": null,
                    "variant_title": null,
                    "product_id": null,
                    "price": "10.00",
                    "total_discount": "0.00"
                }
            ]
        }
    }"##;

    const PRODUCT_JSON: &str = r#"{
        "product": {
            "id": 7,
            "title": "Jacket",
            "product_type": "Outerwear",
            "vendor": "Atelier",
            "tags": "fw24, wool",
            "options": [
                {"name": "Size", "position": 1},
                {"name": "Color", "position": 2}
            ],
            "variants": [
                {"id": 11, "sku": "AB24JKBKM", "barcode": "8801", "option1": "M", "option2": "Black", "option3": null},
                {"id": 12, "sku": "AB24JKBKL", "barcode": "8802", "option1": "L", "option2": "Black", "option3": null}
            ]
        }
    }"#;

    fn fixtures() -> (RestOrder, HashMap<u64, RestProduct>) {
        let order: OrderEnvelope = serde_json::from_str(ORDER_JSON).unwrap();
        let product: ProductEnvelope = serde_json::from_str(PRODUCT_JSON).unwrap();
        let products = HashMap::from([(product.product.id, product.product)]);
        (order.order, products)
    }

    #[test]
    fn test_product_ids_are_distinct() {
        let (order, _) = fixtures();
        assert_eq!(order.product_ids(), vec![7]);
    }

    #[test]
    fn test_convert_order_fields() {
        let (order, products) = fixtures();
        let order = convert_order(order, &products);

        assert_eq!(order.name, "#1001");
        assert_eq!(order.tags, vec!["wholesale", "customer:Maison Kim"]);
        assert_eq!(order.custom_attributes[0].key, "Account Code");
        assert_eq!(order.currency_code.as_deref(), Some("KRW"));
        assert_eq!(order.billing_name.as_deref(), Some("Accounts"));
        assert_eq!(order.line_items.len(), 3);
    }

    #[test]
    fn test_line_item_joins_product_and_variant() {
        let (order, products) = fixtures();
        let order = convert_order(order, &products);

        let first = &order.line_items[0];
        assert_eq!(first.barcode.as_deref(), Some("8801"));
        assert_eq!(
            first.selected_options,
            vec![
                SelectedOption::new("Size", "M"),
                SelectedOption::new("Color", "Black"),
            ]
        );
        assert_eq!(
            first.product.as_ref().map(|p| p.tags.clone()),
            Some(vec!["fw24".to_string(), "wool".to_string()])
        );
        assert_eq!(first.unit_price, Some(Decimal::new(25000, 2)));
        assert_eq!(first.discounted_unit_price, Some(Decimal::new(22500, 2)));

        let second = &order.line_items[1];
        assert_eq!(second.sku.as_deref(), Some("AB24JKBKL"));
        assert_eq!(second.discounted_unit_price, second.unit_price);
    }

    #[test]
    fn test_line_item_without_product() {
        let (order, products) = fixtures();
        let order = convert_order(order, &products);

        let fee = &order.line_items[2];
        assert!(fee.product.is_none());
        assert!(fee.selected_options.is_empty());
        assert_eq!(fee.barcode, None);
        assert_eq!(fee.unit_price, Some(Decimal::new(1000, 2)));
    }

    #[test]
    fn test_missing_product_is_tolerated() {
        let (order, _) = fixtures();
        let order = convert_order(order, &HashMap::new());
        assert!(order.line_items.iter().all(|l| l.product.is_none()));
        assert_eq!(order.line_items[0].sku.as_deref(), Some("AB24JKBKM"));
    }
}
