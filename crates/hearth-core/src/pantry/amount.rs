//! Ingredient amount normalization.
//!
//! Recipe amounts are free text. They are turned into a number in the unit
//! of the matching stock entry by a fixed heuristic:
//!
//! 1. the first decimal number in the text is the magnitude (`0.1` if none);
//! 2. the first matching unit hint scales it (see [`UNIT_HINTS`]);
//! 3. against a `grams` stock entry, magnitudes below 1 are read as
//!    kilograms and multiplied by 1000.
//!
//! Step 3 cannot tell "already grams" from "kilogram fraction" apart, so
//! e.g. `"0.5 cup"` (125) skips the conversion. Existing household data
//! depends on this behaviour; keep it.

use std::sync::LazyLock;

use regex::Regex;

/// Magnitude used when the amount text has no number in it.
pub const DEFAULT_MAGNITUDE: f64 = 0.1;

/// Stock unit that triggers the kilogram-to-gram step.
pub const GRAMS_UNIT: &str = "grams";

/// Substring hints, tested in order; the first hit wins.
pub const UNIT_HINTS: [(&str, f64); 9] = [
    ("tbsp", 15.0),
    ("tsp", 5.0),
    ("cup", 250.0),
    ("small", 0.05),
    ("medium", 0.1),
    ("large", 0.15),
    ("inch", 0.01),
    ("pieces", 0.01),
    ("g", 0.001),
];

static NUMBER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").ok());

/// First decimal number in `text`, or [`DEFAULT_MAGNITUDE`].
pub fn parse_magnitude(text: &str) -> f64 {
    NUMBER
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(DEFAULT_MAGNITUDE)
}

/// Multiplier of the first unit hint found in `text`, if any.
pub fn unit_factor(text: &str) -> Option<f64> {
    UNIT_HINTS
        .iter()
        .find(|(hint, _)| text.contains(hint))
        .map(|(_, factor)| *factor)
}

/// Magnitude after the unit hint, before any stock-unit adjustment.
///
/// Most hints target kilogram-equivalents; spoon and cup hints produce
/// millilitre/gram-scale numbers.
pub fn base_quantity(text: &str) -> f64 {
    let magnitude = parse_magnitude(text);
    match unit_factor(text) {
        Some(factor) => magnitude * factor,
        None => magnitude,
    }
}

/// Quantity of `amount_text` expressed in `stock_unit`.
pub fn required_amount(amount_text: &str, stock_unit: &str) -> f64 {
    let quantity = base_quantity(amount_text);
    if stock_unit == GRAMS_UNIT && quantity < 1.0 {
        quantity * 1000.0
    } else {
        quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn magnitude_defaults_when_missing() {
        assert!(close(parse_magnitude("a pinch"), 0.1));
        assert!(close(parse_magnitude("to taste"), 0.1));
        assert!(close(parse_magnitude("2.5 cups"), 2.5));
        assert!(close(parse_magnitude("1/2 cup"), 1.0));
    }

    #[test]
    fn hint_table_is_applied_in_order() {
        assert!(close(base_quantity("2 tbsp"), 30.0));
        assert!(close(base_quantity("1 tsp"), 5.0));
        assert!(close(base_quantity("1 cup"), 250.0));
        assert!(close(base_quantity("2 small"), 0.1));
        assert!(close(base_quantity("1 medium"), 0.1));
        assert!(close(base_quantity("2 large"), 0.3));
        assert!(close(base_quantity("1 inch"), 0.01));
        assert!(close(base_quantity("4 pieces"), 0.04));
        assert!(close(base_quantity("100g"), 0.1));
        assert!(close(base_quantity("3"), 3.0));
    }

    #[test]
    fn tablespoon_wins_over_teaspoon() {
        assert!(close(base_quantity("1 tbsp + 1 tsp"), 15.0));
    }

    #[test]
    fn grams_stock_converts_kilogram_fractions() {
        assert!(close(required_amount("100g", "grams"), 100.0));
        assert!(close(required_amount("1 medium", "grams"), 100.0));
        // Already >= 1: taken as grams.
        assert!(close(required_amount("2 tbsp", "grams"), 30.0));
        // Half a cup is 125 and skips the conversion.
        assert!(close(required_amount("0.5 cup", "grams"), 125.0));
    }

    #[test]
    fn non_gram_units_are_left_alone() {
        assert!(close(required_amount("1 cup", "kg"), 250.0));
        assert!(close(required_amount("100g", "kg"), 0.1));
        assert!(close(required_amount("2", "pieces"), 2.0));
    }
}
