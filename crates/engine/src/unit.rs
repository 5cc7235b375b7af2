use serde::{Deserialize, Serialize};

use crate::{EngineError, Quantity};

/// Measurement unit of an ingredient.
///
/// The set is closed: sixteen kitchen units, each with a short code (what is
/// stored and exchanged over the API) and singular/plural labels for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "l")]
    Liter,
    #[serde(rename = "ml")]
    Milliliter,
    #[serde(rename = "pcs")]
    Piece,
    #[serde(rename = "tbsp")]
    Tablespoon,
    #[serde(rename = "tsp")]
    Teaspoon,
    #[serde(rename = "cup")]
    Cup,
    #[serde(rename = "oz")]
    Ounce,
    #[serde(rename = "lb")]
    Pound,
    #[serde(rename = "pt")]
    Pint,
    #[serde(rename = "qt")]
    Quart,
    #[serde(rename = "gal")]
    Gallon,
    #[serde(rename = "fl oz")]
    FluidOunce,
    #[serde(rename = "egg")]
    Egg,
    #[serde(rename = "pinch")]
    Pinch,
}

impl Unit {
    pub const ALL: [Unit; 16] = [
        Unit::Kilogram,
        Unit::Gram,
        Unit::Liter,
        Unit::Milliliter,
        Unit::Piece,
        Unit::Tablespoon,
        Unit::Teaspoon,
        Unit::Cup,
        Unit::Ounce,
        Unit::Pound,
        Unit::Pint,
        Unit::Quart,
        Unit::Gallon,
        Unit::FluidOunce,
        Unit::Egg,
        Unit::Pinch,
    ];

    /// Canonical short code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Unit::Kilogram => "kg",
            Unit::Gram => "g",
            Unit::Liter => "l",
            Unit::Milliliter => "ml",
            Unit::Piece => "pcs",
            Unit::Tablespoon => "tbsp",
            Unit::Teaspoon => "tsp",
            Unit::Cup => "cup",
            Unit::Ounce => "oz",
            Unit::Pound => "lb",
            Unit::Pint => "pt",
            Unit::Quart => "qt",
            Unit::Gallon => "gal",
            Unit::FluidOunce => "fl oz",
            Unit::Egg => "egg",
            Unit::Pinch => "pinch",
        }
    }

    #[must_use]
    pub const fn singular(self) -> &'static str {
        match self {
            Unit::Kilogram => "kilogram",
            Unit::Gram => "gram",
            Unit::Liter => "liter",
            Unit::Milliliter => "milliliter",
            Unit::Piece => "piece",
            Unit::Tablespoon => "tablespoon",
            Unit::Teaspoon => "teaspoon",
            Unit::Cup => "cup",
            Unit::Ounce => "ounce",
            Unit::Pound => "pound",
            Unit::Pint => "pint",
            Unit::Quart => "quart",
            Unit::Gallon => "gallon",
            Unit::FluidOunce => "fluid ounce",
            Unit::Egg => "egg",
            Unit::Pinch => "pinch",
        }
    }

    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Unit::Kilogram => "kilograms",
            Unit::Gram => "grams",
            Unit::Liter => "liters",
            Unit::Milliliter => "milliliters",
            Unit::Piece => "pieces",
            Unit::Tablespoon => "tablespoons",
            Unit::Teaspoon => "teaspoons",
            Unit::Cup => "cups",
            Unit::Ounce => "ounces",
            Unit::Pound => "pounds",
            Unit::Pint => "pints",
            Unit::Quart => "quarts",
            Unit::Gallon => "gallons",
            Unit::FluidOunce => "fluid ounces",
            Unit::Egg => "eggs",
            Unit::Pinch => "pinches",
        }
    }

    /// Label to show next to `quantity`: singular for exactly one unit,
    /// plural otherwise.
    #[must_use]
    pub const fn label(self, quantity: Quantity) -> &'static str {
        if quantity.is_one() {
            self.singular()
        } else {
            self.plural()
        }
    }
}

impl core::fmt::Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Unit {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let code = value.trim().to_ascii_lowercase();
        Unit::ALL
            .into_iter()
            .find(|unit| unit.code() == code)
            .ok_or_else(|| EngineError::InvalidUnit(format!("unsupported unit: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_round_trips() {
        for unit in Unit::ALL {
            assert_eq!(Unit::try_from(unit.code()).unwrap(), unit);
        }
        assert_eq!(Unit::try_from(" FL OZ ").unwrap(), Unit::FluidOunce);
        assert!(Unit::try_from("bushel").is_err());
    }

    #[test]
    fn egg_label_depends_on_quantity() {
        assert_eq!(Unit::Egg.label(Quantity::from_units(1)), "egg");
        assert_eq!(Unit::Egg.label(Quantity::from_units(2)), "eggs");
        assert_eq!(Unit::Gram.label(Quantity::new(500)), "grams");
        assert_eq!(Unit::Pinch.label(Quantity::ZERO), "pinches");
    }

    #[test]
    fn serde_uses_codes() {
        let json = serde_json::to_string(&Unit::FluidOunce).unwrap();
        assert_eq!(json, "\"fl oz\"");
        let unit: Unit = serde_json::from_str("\"tbsp\"").unwrap();
        assert_eq!(unit, Unit::Tablespoon);
    }
}
