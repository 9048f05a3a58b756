//! Zedonk CSV rows and serialization.

use std::fmt;
use std::str::FromStr;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::{extract_customer_info, extract_line_fields};
use crate::types::{Order, format_amount};

/// Byte order mark so Excel opens the file as UTF-8.
pub const UTF8_BOM: &str = "\u{FEFF}";

const BASE_HEADER: [&str; 9] = [
    "Order Reference",
    "Customer Name",
    "Account Code",
    "Style",
    "Fabric",
    "Colour",
    "Size",
    "Barcode",
    "Sales Order Quantity",
];

const PRICING_HEADER: [&str; 3] = ["Currency", "Unit Price", "Amount per Unit"];

/// Errors raised while writing CSV output.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The CSV writer rejected a record.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the in-memory buffer failed.
    #[error("CSV buffer error: {0}")]
    Io(#[from] std::io::Error),

    /// The buffer did not hold valid UTF-8.
    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Which column set to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportLayout {
    /// The nine Zedonk order columns.
    #[default]
    Basic,
    /// The nine order columns plus currency, unit price and amount per unit.
    WithPricing,
}

impl ExportLayout {
    /// Header row for this layout.
    #[must_use]
    pub fn header(self) -> Vec<&'static str> {
        let mut header = BASE_HEADER.to_vec();
        if self == Self::WithPricing {
            header.extend(PRICING_HEADER);
        }
        header
    }
}

impl fmt::Display for ExportLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::WithPricing => write!(f, "with_pricing"),
        }
    }
}

impl FromStr for ExportLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "with_pricing" | "pricing" => Ok(Self::WithPricing),
            _ => Err(format!("invalid export layout: {s}")),
        }
    }
}

/// One CSV row: an order line flattened with its order's customer fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    pub order_reference: String,
    pub customer_name: String,
    pub account_code: String,
    pub style: String,
    pub fabric: String,
    pub colour: String,
    pub size: String,
    pub barcode: String,
    pub quantity: i64,
    pub currency: String,
    pub unit_price: Option<Decimal>,
    pub amount_per_unit: Option<Decimal>,
}

impl CsvRow {
    /// Cell values in header order for `layout`.
    #[must_use]
    pub fn record(&self, layout: ExportLayout) -> Vec<String> {
        let mut record = vec![
            self.order_reference.clone(),
            self.customer_name.clone(),
            self.account_code.clone(),
            self.style.clone(),
            self.fabric.clone(),
            self.colour.clone(),
            self.size.clone(),
            self.barcode.clone(),
            self.quantity.to_string(),
        ];
        if layout == ExportLayout::WithPricing {
            record.push(self.currency.clone());
            record.push(self.unit_price.map(format_amount).unwrap_or_default());
            record.push(self.amount_per_unit.map(format_amount).unwrap_or_default());
        }
        record
    }
}

/// One row per line item. Customer fields are resolved once per order.
#[must_use]
pub fn rows_for_order(order: &Order) -> Vec<CsvRow> {
    let customer = extract_customer_info(order);

    order
        .line_items
        .iter()
        .map(|item| {
            let line = extract_line_fields(item);
            CsvRow {
                order_reference: order.name.clone(),
                customer_name: customer.customer_name.clone(),
                account_code: customer.account_code.clone(),
                style: line.style,
                fabric: line.fabric,
                colour: line.colour,
                size: line.size,
                barcode: line.barcode,
                quantity: line.quantity,
                currency: customer.currency.clone(),
                unit_price: line.unit_price,
                amount_per_unit: line.amount_per_unit,
            }
        })
        .collect()
}

/// Serialize rows as BOM-prefixed CSV with a header row.
///
/// Fields are quoted only when they contain a comma, a double quote, CR or
/// LF; embedded quotes are doubled. Records end with `\n`.
///
/// # Errors
///
/// Returns [`ExportError`] if the writer fails, which only happens on
/// allocation-level I/O errors for the in-memory buffer.
pub fn write_csv(rows: &[CsvRow], layout: ExportLayout) -> Result<String, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(UTF8_BOM.as_bytes().to_vec());

    writer.write_record(layout.header())?;
    for row in rows {
        writer.write_record(row.record(layout))?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Rows for every order, in input order, serialized as CSV.
///
/// # Errors
///
/// See [`write_csv`].
pub fn export_orders(orders: &[Order], layout: ExportLayout) -> Result<String, ExportError> {
    let rows: Vec<CsvRow> = orders.iter().flat_map(rows_for_order).collect();
    write_csv(&rows, layout)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Attribute, LineItem, SelectedOption};

    fn sample_order() -> Order {
        Order {
            name: "#1001".to_string(),
            note: Some("고객명: Atelier, Nord\nAccount Code: 3001".to_string()),
            currency_code: Some("EUR".to_string()),
            line_items: vec![
                LineItem {
                    title: "Jacket".to_string(),
                    quantity: 2,
                    sku: Some("AB24JKBKM".to_string()),
                    barcode: Some("8801".to_string()),
                    selected_options: vec![
                        SelectedOption::new("Size", "M"),
                        SelectedOption::new("Color", "Black"),
                    ],
                    unit_price: Some(Decimal::new(25000, 2)),
                    ..LineItem::default()
                },
                LineItem {
                    title: "Shoes".to_string(),
                    quantity: 1,
                    sku: Some("SN01SSWH245".to_string()),
                    variant_title: Some("245 / White".to_string()),
                    ..LineItem::default()
                },
            ],
            ..Order::default()
        }
    }

    #[test]
    fn test_header_per_layout() {
        assert_eq!(ExportLayout::Basic.header().len(), 9);
        let header = ExportLayout::WithPricing.header();
        assert_eq!(header.len(), 12);
        assert_eq!(header.last(), Some(&"Amount per Unit"));
    }

    #[test]
    fn test_rows_for_order() {
        let rows = rows_for_order(&sample_order());
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.order_reference, "#1001");
        assert_eq!(first.customer_name, "Atelier, Nord");
        assert_eq!(first.account_code, "3001");
        assert_eq!(first.style, "AB24JK");
        assert_eq!(first.fabric, "JACKET");
        assert_eq!(first.size, "M");
        assert_eq!(first.colour, "Black");
        assert_eq!(first.currency, "EUR");

        let second = &rows[1];
        assert_eq!(second.style, "SN01SS");
        assert_eq!(second.size, "245");
        assert_eq!(second.colour, "White");
        assert_eq!(second.barcode, "");
    }

    #[test]
    fn test_csv_starts_with_bom_and_header() {
        let csv = write_csv(&[], ExportLayout::Basic).unwrap();
        assert!(csv.starts_with(UTF8_BOM));
        assert_eq!(
            csv.trim_start_matches(UTF8_BOM),
            "Order Reference,Customer Name,Account Code,Style,Fabric,Colour,Size,Barcode,Sales Order Quantity\n"
        );
    }

    #[test]
    fn test_csv_quotes_commas_quotes_and_newlines() {
        let row = CsvRow {
            order_reference: "#1".to_string(),
            customer_name: "Smith, \"The\" Shop".to_string(),
            account_code: "line1\nline2".to_string(),
            style: "carriage\rreturn".to_string(),
            quantity: 3,
            ..CsvRow::default()
        };
        let csv = write_csv(&[row], ExportLayout::Basic).unwrap();
        let body = csv.lines().nth(1).unwrap();
        assert!(body.starts_with("#1,\"Smith, \"\"The\"\" Shop\",\"line1"));
        assert!(csv.contains("\"carriage\rreturn\""));
        assert!(csv.ends_with(",,,,,3\n"));
    }

    #[test]
    fn test_csv_leaves_plain_fields_unquoted() {
        let row = CsvRow {
            order_reference: "#1002".to_string(),
            customer_name: "김민수".to_string(),
            quantity: 1,
            ..CsvRow::default()
        };
        let csv = write_csv(&[row], ExportLayout::Basic).unwrap();
        assert!(csv.ends_with("#1002,김민수,,,,,,,1\n"));
    }

    #[test]
    fn test_pricing_columns() {
        let csv = export_orders(&[sample_order()], ExportLayout::WithPricing).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with(",2,EUR,250.00,250.00"));
        assert!(lines[2].ends_with(",1,EUR,,"));
    }

    #[test]
    fn test_export_preserves_order_sequence() {
        let mut second = sample_order();
        second.name = "#1002".to_string();
        second.custom_attributes = vec![Attribute::new("Customer Name", "Other")];
        let csv = export_orders(&[sample_order(), second], ExportLayout::Basic).unwrap();
        let refs: Vec<&str> = csv
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert_eq!(refs, vec!["#1001", "#1001", "#1002", "#1002"]);
    }

    #[test]
    fn test_layout_parse() {
        assert_eq!("basic".parse::<ExportLayout>(), Ok(ExportLayout::Basic));
        assert_eq!(
            "pricing".parse::<ExportLayout>(),
            Ok(ExportLayout::WithPricing)
        );
        assert!("xml".parse::<ExportLayout>().is_err());
    }
}
