//! Positive decimal types for prices and quantities
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point errors).
//! Both types reject zero and negative values at construction, so an order
//! holding them always satisfies `size > 0` and `price > 0`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Limit price of an order, strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Returns `None` unless `value > 0`.
    pub fn try_new(value: Decimal) -> Option<Self> {
        (value > Decimal::ZERO).then_some(Self(value))
    }

    pub fn from_u64(value: u64) -> Self {
        assert!(value > 0, "Price must be positive");
        Self(Decimal::from(value))
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Decimal::from_str(s).ok().and_then(Self::try_new)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::try_new(value).ok_or_else(|| serde::de::Error::custom("price must be positive"))
    }
}

/// Unit quantity of an order, strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Returns `None` unless `value > 0`.
    pub fn try_new(value: Decimal) -> Option<Self> {
        (value > Decimal::ZERO).then_some(Self(value))
    }

    pub fn from_u64(value: u64) -> Self {
        assert!(value > 0, "Quantity must be positive");
        Self(Decimal::from(value))
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Decimal::from_str(s).ok().and_then(Self::try_new)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Quantity times price, exact or `None`.
    ///
    /// `Decimal` multiplication rounds once the product needs more than 28
    /// fractional digits or 96 bits of mantissa, and only reports overflow.
    /// A rounded product keeps fewer fractional digits than the factors
    /// carry between them, so that case is reported as `None` too.
    pub fn notional(&self, price: Price) -> Option<Decimal> {
        let size = self.0.normalize();
        let price = price.0.normalize();
        let product = size.checked_mul(price)?;
        (product.scale() == size.scale() + price.scale()).then_some(product)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::try_new(value).ok_or_else(|| serde::de::Error::custom("quantity must be positive"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rejects_non_positive() {
        assert!(Price::try_new(Decimal::ZERO).is_none());
        assert!(Price::try_new(Decimal::from(-5)).is_none());
        assert!(Quantity::try_new(Decimal::ZERO).is_none());
        assert!(Quantity::from_str("-0.1").is_none());
        assert!(Quantity::from_str("abc").is_none());
    }

    #[test]
    fn test_notional() {
        let qty = Quantity::from_u64(10);
        let price = Price::from_str("150.25").unwrap();
        assert_eq!(qty.notional(price), Some(Decimal::from_str("1502.50").unwrap()));
    }

    #[test]
    fn test_notional_refuses_to_round() {
        let tiny = Decimal::from_str("0.000000000000001").unwrap();
        let qty = Quantity::try_new(tiny).unwrap();
        let price = Price::try_new(tiny).unwrap();
        assert_eq!(qty.notional(price), None);

        // Trailing zeros do not count against the 28 digit limit.
        let qty = Quantity::from_str("2.00000000000000000000").unwrap();
        let price = Price::from_str("1.500000000000000").unwrap();
        assert_eq!(qty.notional(price), Some(Decimal::from(3)));
    }

    #[test]
    fn test_notional_refuses_wide_mantissa() {
        let qty = Quantity::from_str("12345678901234.56789").unwrap();
        let price = Price::from_str("98765432109876.54321").unwrap();
        assert_eq!(qty.notional(price), None);
    }

    #[test]
    fn test_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Price>("\"0\"").is_err());
        assert!(serde_json::from_str::<Quantity>("\"-1\"").is_err());
        let price: Price = serde_json::from_str("\"150.00\"").unwrap();
        assert_eq!(price.as_decimal(), Decimal::from(150));
    }

    #[test]
    #[should_panic(expected = "Price must be positive")]
    fn test_price_from_zero_panics() {
        Price::from_u64(0);
    }

    proptest! {
        #[test]
        fn prop_positive_values_accepted(raw in 1i64..i64::MAX) {
            let value = Decimal::from(raw);
            prop_assert_eq!(Quantity::try_new(value).unwrap().as_decimal(), value);
            prop_assert_eq!(Price::try_new(value).unwrap().as_decimal(), value);
        }
    }
}
