use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Decimal places of the native token's smallest unit.
pub const NATIVE_DECIMALS: u32 = 18;

/// Non-negative decimal amount of native token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal, rejecting negative amounts.
    pub fn new(amount: Decimal) -> Result<Self, TypeError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(TypeError::NegativePrice(amount.to_string()));
        }
        Ok(Self(amount.normalize()))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_free(&self) -> bool {
        self.0.is_zero()
    }

    /// Amount in the token's smallest unit (18 decimals).
    ///
    /// Fails if the price carries more precision than the unit allows or
    /// the scaled amount does not fit.
    pub fn to_base_units(&self) -> Result<u128, TypeError> {
        let scale = Decimal::from_i128_with_scale(10i128.pow(NATIVE_DECIMALS), 0);
        let scaled = self
            .0
            .checked_mul(scale)
            .ok_or_else(|| TypeError::PriceOverflow(self.0.to_string()))?;
        if !scaled.fract().is_zero() {
            return Err(TypeError::PriceOverflow(self.0.to_string()));
        }
        scaled
            .to_u128()
            .ok_or_else(|| TypeError::PriceOverflow(self.0.to_string()))
    }
}

impl TryFrom<Decimal> for Price {
    type Error = TypeError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl FromStr for Price {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| TypeError::InvalidPrice(s.to_string()))?;
        Self::new(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_price_is_rejected() {
        let err = Price::new(Decimal::new(-1, 0)).unwrap_err();
        assert!(matches!(err, TypeError::NegativePrice(_)));
    }

    #[test]
    fn zero_is_free() {
        assert!(Price::ZERO.is_free());
        assert!("0".parse::<Price>().unwrap().is_free());
    }

    #[test]
    fn parse_decimal_string() {
        let price: Price = "1.5".parse().unwrap();
        assert_eq!(price.amount(), Decimal::new(15, 1));
        assert!("abc".parse::<Price>().is_err());
        assert!("-0.1".parse::<Price>().is_err());
    }

    #[test]
    fn base_units_use_eighteen_decimals() {
        let price: Price = "0.15".parse().unwrap();
        assert_eq!(price.to_base_units().unwrap(), 150_000_000_000_000_000);

        let whole: Price = "2".parse().unwrap();
        assert_eq!(whole.to_base_units().unwrap(), 2_000_000_000_000_000_000);
    }

    #[test]
    fn sub_unit_precision_is_rejected() {
        let price: Price = "0.0000000000000000001".parse().unwrap();
        assert!(matches!(
            price.to_base_units(),
            Err(TypeError::PriceOverflow(_))
        ));
    }

    #[test]
    fn trailing_zeros_are_normalized() {
        let a: Price = "1.50".parse().unwrap();
        let b: Price = "1.5".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "1.5");
    }

    #[test]
    fn serde_roundtrip_rejects_negative() {
        let price: Price = "0.1".parse().unwrap();
        let json = serde_json::to_string(&price).unwrap();
        let parsed: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(price, parsed);

        let bad: Result<Price, _> = serde_json::from_str("\"-3\"");
        assert!(bad.is_err());
    }
}
