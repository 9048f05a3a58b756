//! Per-line field extraction: options, style, fabric and prices.

use rust_decimal::Decimal;

use super::style::{fabric_from_style, style_from_code};
use crate::types::{LineItem, find_metafield, parse_amount};

const SIZE_OPTION_NAMES: &[&str] = &["size", "사이즈"];
const COLOUR_OPTION_NAMES: &[&str] = &["color", "colour", "색상"];

/// Shopify's variant title for products without options.
const DEFAULT_VARIANT_TITLE: &str = "Default Title";
const VARIANT_TITLE_SEPARATOR: &str = " / ";

const STYLE_METAFIELDS: &[(&str, &str)] = &[("zedonk", "style"), ("custom", "style")];
const FABRIC_METAFIELDS: &[(&str, &str)] = &[("zedonk", "fabric"), ("custom", "fabric")];
const PRICE_METAFIELDS: &[(&str, &str)] = &[
    ("zedonk", "wholesale_price"),
    ("custom", "wholesale_price"),
];

/// Fields derived from one line item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineFields {
    pub style: String,
    pub fabric: String,
    pub colour: String,
    pub size: String,
    pub barcode: String,
    pub quantity: i64,
    pub unit_price: Option<Decimal>,
    pub amount_per_unit: Option<Decimal>,
}

/// Extract every per-line column from a line item.
#[must_use]
pub fn extract_line_fields(item: &LineItem) -> LineFields {
    let (size, colour) = size_and_colour(item);
    let (style, fabric) = style_and_fabric(item);
    let unit_price = unit_price(item);

    LineFields {
        style,
        fabric,
        colour,
        size,
        barcode: item.barcode.clone().unwrap_or_default(),
        quantity: item.quantity,
        unit_price,
        amount_per_unit: item.discounted_unit_price.or(unit_price),
    }
}

/// Size and colour from the selected options.
///
/// When neither option is present, falls back to splitting the variant title
/// (`"M / Black"`) into size then colour.
#[must_use]
pub fn size_and_colour(item: &LineItem) -> (String, String) {
    let mut size = String::new();
    let mut colour = String::new();

    for option in &item.selected_options {
        let name = option.name.trim().to_lowercase();
        if SIZE_OPTION_NAMES.contains(&name.as_str()) {
            size.clone_from(&option.value);
        } else if COLOUR_OPTION_NAMES.contains(&name.as_str()) {
            colour.clone_from(&option.value);
        }
    }

    if size.is_empty()
        && colour.is_empty()
        && let Some(title) = item
            .variant_title
            .as_deref()
            .filter(|t| !t.is_empty() && *t != DEFAULT_VARIANT_TITLE)
    {
        let mut parts = title.split(VARIANT_TITLE_SEPARATOR).map(str::trim);
        size = parts.next().unwrap_or_default().to_string();
        colour = parts.next().unwrap_or_default().to_string();
    }

    (size, colour)
}

fn line_metafield<'a>(item: &'a LineItem, keys: &[(&str, &str)]) -> Option<&'a str> {
    find_metafield(&item.variant_metafields, keys).or_else(|| {
        item.product
            .as_ref()
            .and_then(|p| find_metafield(&p.metafields, keys))
    })
}

/// Style and fabric for a line.
///
/// Style comes from a style metafield, else is decoded from the SKU (or the
/// barcode when there is no SKU). Fabric comes from a fabric metafield, else
/// from the category code at the end of the style.
#[must_use]
pub fn style_and_fabric(item: &LineItem) -> (String, String) {
    let style = line_metafield(item, STYLE_METAFIELDS).map_or_else(
        || {
            item.sku
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .or(item.barcode.as_deref())
                .map(style_from_code)
                .unwrap_or_default()
        },
        str::to_uppercase,
    );

    let fabric = line_metafield(item, FABRIC_METAFIELDS)
        .map_or_else(|| fabric_from_style(&style), str::to_uppercase);

    (style, fabric)
}

/// Unit price: the first wholesale price metafield that parses (variant
/// before product), else the line's original unit price.
#[must_use]
pub fn unit_price(item: &LineItem) -> Option<Decimal> {
    let product_fields = item.product.as_ref().map(|p| p.metafields.as_slice());
    [Some(item.variant_metafields.as_slice()), product_fields]
        .into_iter()
        .flatten()
        .flat_map(|fields| {
            PRICE_METAFIELDS
                .iter()
                .filter_map(move |key| find_metafield(fields, std::slice::from_ref(key)))
        })
        .find_map(parse_amount)
        .or(item.unit_price)
}
