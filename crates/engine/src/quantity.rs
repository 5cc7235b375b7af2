//! Stock quantities.

use std::{fmt, str::FromStr};

use crate::{
    EngineError, ResultEngine,
    util::{format_fixed, parse_fixed},
};

/// Number of fractional digits kept for quantities.
pub const QUANTITY_SCALE: u32 = 3;
const ONE: i64 = 1_000;

/// An amount of an ingredient, stored as integer **thousandths** of its unit.
///
/// `Quantity::from_units(2)` is two kilograms, two pieces, two eggs, ...
/// depending on the ingredient unit. Three fraction digits are supported, so
/// `0.125` kg is representable exactly.
///
/// ```rust
/// use engine::Quantity;
///
/// let q: Quantity = "1.25".parse().unwrap();
/// assert_eq!(q.milli(), 1250);
/// assert_eq!(q.to_string(), "1.25");
/// assert_eq!(Quantity::from_units(2).to_string(), "2");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Quantity(i64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    /// Creates a quantity from thousandths of a unit.
    #[must_use]
    pub const fn new(milli: i64) -> Self {
        Self(milli)
    }

    /// Creates a quantity from whole units.
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units * ONE)
    }

    /// Returns the raw value in thousandths.
    #[must_use]
    pub const fn milli(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `true` when the quantity is exactly one unit.
    #[must_use]
    pub const fn is_one(self) -> bool {
        self.0 == ONE
    }

    /// Scales a per-unit requirement by a number of sold units.
    pub fn times(self, count: i64) -> ResultEngine<Quantity> {
        self.0
            .checked_mul(count)
            .map(Quantity)
            .ok_or_else(|| EngineError::InvalidQuantity("quantity too large".to_string()))
    }

    pub fn checked_add(self, rhs: Quantity) -> ResultEngine<Quantity> {
        self.0
            .checked_add(rhs.0)
            .map(Quantity)
            .ok_or_else(|| EngineError::InvalidQuantity("quantity too large".to_string()))
    }

    /// Subtracts `rhs`, refusing to go below zero.
    pub fn checked_sub(self, rhs: Quantity) -> Option<Quantity> {
        self.0
            .checked_sub(rhs.0)
            .filter(|value| *value >= 0)
            .map(Quantity)
    }

    /// Stock levels must never be negative.
    pub(crate) fn ensure_stock(self) -> ResultEngine<Quantity> {
        if self.is_negative() {
            return Err(EngineError::InvalidQuantity(
                "quantity cannot be negative".to_string(),
            ));
        }
        Ok(self)
    }

    /// Recipe lines must consume something.
    pub(crate) fn ensure_positive(self, label: &str) -> ResultEngine<Quantity> {
        if self.0 <= 0 {
            return Err(EngineError::InvalidQuantity(format!("{label} must be > 0")));
        }
        Ok(self)
    }
}

/// Formats without trailing zeros: `2`, `0.5`, `1.125`.
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = format_fixed(self.0, QUANTITY_SCALE);
        let trimmed = full.trim_end_matches('0').trim_end_matches('.');
        f.write_str(trimmed)
    }
}

impl FromStr for Quantity {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s, QUANTITY_SCALE, "quantity").map(Quantity)
    }
}

impl From<Quantity> for i64 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(Quantity::new(2000).to_string(), "2");
        assert_eq!(Quantity::new(500).to_string(), "0.5");
        assert_eq!(Quantity::new(1125).to_string(), "1.125");
        assert_eq!(Quantity::ZERO.to_string(), "0");
        assert_eq!(Quantity::new(-250).to_string(), "-0.25");
    }

    #[test]
    fn parse_keeps_three_decimals() {
        assert_eq!("0.125".parse::<Quantity>().unwrap(), Quantity::new(125));
        assert_eq!("3".parse::<Quantity>().unwrap(), Quantity::from_units(3));
        assert!("0.0001".parse::<Quantity>().is_err());
    }

    #[test]
    fn subtraction_never_goes_negative() {
        let stock = Quantity::from_units(1);
        assert_eq!(
            stock.checked_sub(Quantity::new(400)),
            Some(Quantity::new(600))
        );
        assert_eq!(stock.checked_sub(stock), Some(Quantity::ZERO));
        assert_eq!(stock.checked_sub(Quantity::new(1001)), None);
    }

    #[test]
    fn stock_and_recipe_checks() {
        assert!(Quantity::new(-1).ensure_stock().is_err());
        assert!(Quantity::ZERO.ensure_stock().is_ok());
        assert!(Quantity::ZERO.ensure_positive("recipe quantity").is_err());
        assert!(Quantity::new(1).ensure_positive("recipe quantity").is_ok());
    }
}
