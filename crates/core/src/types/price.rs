//! Decimal money helpers.
//!
//! Shopify sends amounts as decimal strings (`"129.00"`). Money-typed
//! metafields arrive as JSON (`{"amount":"129.00","currency_code":"EUR"}`).
//! Both go through [`parse_amount`] so a price never passes through `f64`.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

#[derive(Deserialize)]
struct MoneyMetafield {
    amount: String,
}

/// Parse a decimal amount from a plain string or a money metafield JSON value.
///
/// Returns `None` for blank or unparseable input.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        let money: MoneyMetafield = serde_json::from_str(trimmed).ok()?;
        return Decimal::from_str(money.amount.trim()).ok();
    }
    Decimal::from_str(trimmed).ok()
}

/// Render an amount with exactly two decimal places (`129` -> `"129.00"`).
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}
