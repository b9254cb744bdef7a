//! Monetary amount extraction for Indian currency units

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

lazy_static! {
    /// Ordered alternatives; the first one yielding a parseable amount wins
    static ref VALUE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)(?:\b(?:rs\.?|inr|rupees?)|₹)\s*([0-9,]+(?:\.[0-9]+)?)\s*(crores?|cr|lakhs?)\b").unwrap(),
        Regex::new(r"(?i)([0-9,]+(?:\.[0-9]+)?)\s*(crores?|cr|lakhs?)\b").unwrap(),
        Regex::new(r"(?i)(?:\b(?:rs\.?|inr|rupees?)|₹)\s*([0-9,]+(?:\.[0-9]+)?)").unwrap(),
    ];
}

/// One crore in rupees
pub const CRORE: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);
/// One lakh in rupees
pub const LAKH: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// An amount found in text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderValue {
    /// Amount in rupees
    pub amount: Decimal,
    /// Matched source text
    pub text: String,
}

/// Extract the first monetary amount from `text`
///
/// Returns `None` when no currency pattern matches; a missing amount is never
/// reported as zero.
pub fn extract_order_value(text: &str) -> Option<OrderValue> {
    for pattern in VALUE_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let Some(number) = caps.get(1) else {
                continue;
            };
            let Ok(base) = Decimal::from_str(&number.as_str().replace(',', "")) else {
                continue;
            };
            let multiplier = caps
                .get(2)
                .map(|unit| unit_multiplier(unit.as_str()))
                .unwrap_or(Decimal::ONE);
            let Some(amount) = base.checked_mul(multiplier) else {
                continue;
            };

            return Some(OrderValue {
                amount,
                text: caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default(),
            });
        }
    }
    None
}

fn unit_multiplier(unit: &str) -> Decimal {
    let unit = unit.to_lowercase();
    if unit.starts_with("crore") || unit == "cr" {
        CRORE
    } else if unit.starts_with("lakh") {
        LAKH
    } else {
        Decimal::ONE
    }
}
