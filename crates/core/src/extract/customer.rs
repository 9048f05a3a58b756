//! Customer name, account code and currency resolution.
//!
//! Each field is resolved by walking a fixed list of sources and taking the
//! first usable value. `N/A` (any case) and blank strings count as missing,
//! so a placeholder in an early source does not block a later one.

use serde::Serialize;

use super::note::{account_code_from_note, currency_from_note, customer_name_from_note};
use crate::types::{Attribute, Order, PersonName};

const CUSTOMER_NAME_KEYS: &[&str] = &["Customer Name", "customer_name"];
const ACCOUNT_CODE_KEYS: &[&str] = &["Account Code", "account_code"];
const CURRENCY_KEYS: &[&str] = &["Currency", "currency"];

const CUSTOMER_TAG_PREFIX: &str = "customer";
const ACCOUNT_TAG_PREFIX: &str = "account";

/// Per-order values repeated on every CSV row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomerInfo {
    pub customer_name: String,
    pub account_code: String,
    pub currency: String,
}

/// Resolve all per-order customer fields.
#[must_use]
pub fn extract_customer_info(order: &Order) -> CustomerInfo {
    CustomerInfo {
        customer_name: customer_name(order),
        account_code: account_code(order),
        currency: currency(order),
    }
}

/// Customer name.
///
/// Precedence: custom attribute, order note, `customer:` tag, customer
/// record, shipping address, billing address.
#[must_use]
pub fn customer_name(order: &Order) -> String {
    attribute_value(&order.custom_attributes, CUSTOMER_NAME_KEYS)
        .or_else(|| {
            order
                .note
                .as_deref()
                .and_then(customer_name_from_note)
                .and_then(usable)
        })
        .or_else(|| tag_value(&order.tags, CUSTOMER_TAG_PREFIX))
        .or_else(|| {
            order
                .customer
                .as_ref()
                .map(PersonName::full_name)
                .and_then(usable)
        })
        .or_else(|| order.shipping_name.clone().and_then(usable))
        .or_else(|| order.billing_name.clone().and_then(usable))
        .unwrap_or_default()
}

/// Account code.
///
/// Precedence: custom attribute, `Account Code:` line in the note,
/// `account:` tag.
#[must_use]
pub fn account_code(order: &Order) -> String {
    attribute_value(&order.custom_attributes, ACCOUNT_CODE_KEYS)
        .or_else(|| order.note.as_deref().and_then(account_code_from_note))
        .or_else(|| tag_value(&order.tags, ACCOUNT_TAG_PREFIX))
        .unwrap_or_default()
}

/// Currency code.
///
/// Precedence: custom attribute, `Currency:` line in the note, the order's
/// own currency.
#[must_use]
pub fn currency(order: &Order) -> String {
    attribute_value(&order.custom_attributes, CURRENCY_KEYS)
        .map(|c| c.to_ascii_uppercase())
        .or_else(|| order.note.as_deref().and_then(currency_from_note))
        .or_else(|| order.currency_code.clone().and_then(usable))
        .unwrap_or_default()
}

fn usable(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("N/A") {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}

/// Last attribute matching any of `keys` wins, mirroring how Shopify shows
/// duplicated attributes.
fn attribute_value(attributes: &[Attribute], keys: &[&str]) -> Option<String> {
    attributes
        .iter()
        .rev()
        .filter(|attr| keys.contains(&attr.key.as_str()))
        .find_map(|attr| attr.value.clone().and_then(usable))
}

/// Value of a `prefix:value` tag, prefix matched case-insensitively.
fn tag_value(tags: &[String], prefix: &str) -> Option<String> {
    tags.iter().find_map(|tag| {
        let (head, value) = tag.split_once(':')?;
        if head.trim().eq_ignore_ascii_case(prefix) {
            usable(value.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Order {
        Order {
            name: "#1001".to_string(),
            ..Order::default()
        }
    }

    #[test]
    fn test_attribute_beats_note() {
        let mut o = order();
        o.custom_attributes = vec![Attribute::new("Customer Name", "From Attribute")];
        o.note = Some("Customer Name: From Note".to_string());
        assert_eq!(customer_name(&o), "From Attribute");
    }

    #[test]
    fn test_snake_case_attribute_keys() {
        let mut o = order();
        o.custom_attributes = vec![
            Attribute::new("customer_name", "Snake Shop"),
            Attribute::new("account_code", "777"),
        ];
        let info = extract_customer_info(&o);
        assert_eq!(info.customer_name, "Snake Shop");
        assert_eq!(info.account_code, "777");
    }

    #[test]
    fn test_na_attribute_falls_through_to_note() {
        let mut o = order();
        o.custom_attributes = vec![
            Attribute::new("Customer Name", "N/A"),
            Attribute::new("Account Code", "n/a"),
        ];
        o.note = Some("고객명: 서울상회\nAccount Code: 4455".to_string());
        let info = extract_customer_info(&o);
        assert_eq!(info.customer_name, "서울상회");
        assert_eq!(info.account_code, "4455");
    }

    #[test]
    fn test_note_beats_tag() {
        let mut o = order();
        o.note = Some("Customer Name: Note Shop".to_string());
        o.tags = vec!["customer: Tag Shop".to_string()];
        assert_eq!(customer_name(&o), "Note Shop");
    }

    #[test]
    fn test_tag_beats_customer_record() {
        let mut o = order();
        o.tags = vec!["wholesale".to_string(), "Customer:Tag Shop".to_string()];
        o.customer = Some(PersonName {
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
        });
        assert_eq!(customer_name(&o), "Tag Shop");
    }

    #[test]
    fn test_customer_record_beats_addresses() {
        let mut o = order();
        o.customer = Some(PersonName {
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
        });
        o.shipping_name = Some("Ship To".to_string());
        assert_eq!(customer_name(&o), "Jane Doe");
    }

    #[test]
    fn test_address_fallbacks() {
        let mut o = order();
        o.customer = Some(PersonName::default());
        o.shipping_name = Some("  ".to_string());
        o.billing_name = Some("Bill To".to_string());
        assert_eq!(customer_name(&o), "Bill To");

        o.shipping_name = Some("Ship To".to_string());
        assert_eq!(customer_name(&o), "Ship To");
    }

    #[test]
    fn test_nothing_found_is_empty() {
        assert_eq!(extract_customer_info(&order()), CustomerInfo::default());
    }

    #[test]
    fn test_last_duplicate_attribute_wins() {
        let mut o = order();
        o.custom_attributes = vec![
            Attribute::new("Account Code", "1"),
            Attribute::new("Account Code", "2"),
        ];
        assert_eq!(account_code(&o), "2");
    }

    #[test]
    fn test_account_code_from_tag() {
        let mut o = order();
        o.tags = vec!["account: 9001".to_string()];
        assert_eq!(account_code(&o), "9001");
    }

    #[test]
    fn test_currency_precedence() {
        let mut o = order();
        o.currency_code = Some("KRW".to_string());
        assert_eq!(currency(&o), "KRW");

        o.note = Some("Currency: gbp".to_string());
        assert_eq!(currency(&o), "GBP");

        o.custom_attributes = vec![Attribute::new("currency", "eur")];
        assert_eq!(currency(&o), "EUR");
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let mut o = order();
        o.note = Some("Customer Name: Same\nAccount Code: 12".to_string());
        assert_eq!(extract_customer_info(&o), extract_customer_info(&o));
    }
}
