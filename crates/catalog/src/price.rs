//! Rupiah prices.

use serde::{Deserialize, Serialize};

use pricelens_core::{FieldErrors, ValueObject};

/// Lowest accepted price, in rupiah.
pub const MIN_PRICE: u64 = 100;
/// Highest accepted price, in rupiah.
pub const MAX_PRICE: u64 = 1_000_000_000;

/// A price in whole rupiah (IDR has no minor unit in practice).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl ValueObject for Price {}

impl Price {
    /// Checked constructor; `None` outside `MIN_PRICE..=MAX_PRICE`.
    pub fn new(amount: u64) -> Option<Self> {
        (MIN_PRICE..=MAX_PRICE).contains(&amount).then_some(Self(amount))
    }

    pub fn amount(&self) -> u64 {
        self.0
    }

    /// `Rp 1.250.000` (Indonesian thousands separator).
    pub fn format_idr(&self) -> String {
        format!("Rp {}", group_thousands(self.0))
    }
}

fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Record a field error when `amount` is outside the accepted range.
pub fn check_price(errors: &mut FieldErrors, field: &str, amount: u64) -> Option<Price> {
    let price = Price::new(amount);
    if price.is_none() {
        errors.add(
            field,
            format!("{field} must be between {MIN_PRICE} and {MAX_PRICE} rupiah"),
        );
    }
    price
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bounds_are_inclusive() {
        assert!(Price::new(MIN_PRICE - 1).is_none());
        assert!(Price::new(MIN_PRICE).is_some());
        assert!(Price::new(MAX_PRICE).is_some());
        assert!(Price::new(MAX_PRICE + 1).is_none());
    }

    #[test]
    fn formats_with_dots() {
        assert_eq!(Price::new(100).unwrap().format_idr(), "Rp 100");
        assert_eq!(Price::new(15_000).unwrap().format_idr(), "Rp 15.000");
        assert_eq!(Price::new(1_250_000).unwrap().format_idr(), "Rp 1.250.000");
    }

    proptest! {
        #[test]
        fn check_price_agrees_with_constructor(amount in 0u64..2_000_000_000) {
            let mut errors = FieldErrors::new();
            let checked = check_price(&mut errors, "price", amount);
            prop_assert_eq!(checked, Price::new(amount));
            prop_assert_eq!(errors.is_empty(), checked.is_some());
        }
    }
}
