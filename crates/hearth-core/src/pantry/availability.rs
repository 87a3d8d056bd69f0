//! Dish availability and missing-ingredient reporting.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::amount::required_amount;
use super::model::{Dish, FoodMenu, MealType, Stock};

/// Why one ingredient of a dish cannot be covered by the stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Deficiency {
    /// Present in stock but below the required amount.
    Short {
        ingredient: String,
        shortfall: f64,
        unit: String,
    },
    /// No stock entry in either partition.
    NotInStock { ingredient: String },
}

impl Deficiency {
    pub fn ingredient(&self) -> &str {
        match self {
            Deficiency::Short { ingredient, .. } | Deficiency::NotInStock { ingredient } => {
                ingredient
            }
        }
    }
}

impl fmt::Display for Deficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deficiency::Short {
                ingredient,
                shortfall,
                unit,
            } => write!(f, "{ingredient} (need {shortfall:.2} {unit} more)"),
            Deficiency::NotInStock { ingredient } => write!(f, "{ingredient} (not in stock)"),
        }
    }
}

/// A dish that cannot be cooked, with its deficiency lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishShortage {
    pub dish: String,
    pub missing: Vec<String>,
}

/// True iff every ingredient resolves and is stocked in the required amount.
pub fn is_available(dish: &Dish, stock: &Stock) -> bool {
    dish.ingredients.iter().all(|(ingredient, amount)| {
        stock
            .lookup(ingredient)
            .is_some_and(|entry| entry.item.quantity >= required_amount(amount, &entry.item.unit))
    })
}

/// Structured deficiencies of `dish`, in ingredient order.
pub fn deficiencies(dish: &Dish, stock: &Stock) -> Vec<Deficiency> {
    dish.ingredients
        .iter()
        .filter_map(|(ingredient, amount)| match stock.lookup(ingredient) {
            Some(entry) => {
                let required = required_amount(amount, &entry.item.unit);
                (entry.item.quantity < required).then(|| Deficiency::Short {
                    ingredient: ingredient.clone(),
                    shortfall: required - entry.item.quantity,
                    unit: entry.item.unit.clone(),
                })
            }
            None => Some(Deficiency::NotInStock {
                ingredient: ingredient.clone(),
            }),
        })
        .collect()
}

/// Human-readable deficiency lines such as `"rice (need 0.50 kg more)"`.
pub fn missing_ingredients(dish: &Dish, stock: &Stock) -> Vec<String> {
    deficiencies(dish, stock)
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Every slot of the menu mapped to its under-suppliable dishes.
///
/// Each slot is present in the result, with an empty list when all of its
/// dishes can be cooked.
pub fn all_missing_ingredients(menu: &FoodMenu, stock: &Stock) -> IndexMap<MealType, Vec<DishShortage>> {
    menu.iter()
        .map(|(meal, dishes)| {
            let shortages = dishes
                .iter()
                .filter_map(|dish| {
                    let missing = missing_ingredients(dish, stock);
                    (!missing.is_empty()).then(|| DishShortage {
                        dish: dish.name.clone(),
                        missing,
                    })
                })
                .collect();
            (meal, shortages)
        })
        .collect()
}

/// Unique ingredient names across all shortages, in first-seen order.
///
/// Names are the part of each deficiency line before `" ("`.
pub fn missing_item_names(shortages: &IndexMap<MealType, Vec<DishShortage>>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for line in shortages.values().flatten().flat_map(|s| s.missing.iter()) {
        let name = line.split(" (").next().unwrap_or(line);
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Names of the cookable dishes in `meal`, preserving menu order.
pub fn available_dishes(menu: &FoodMenu, stock: &Stock, meal: MealType) -> Vec<String> {
    menu.dishes(meal)
        .iter()
        .filter(|dish| is_available(dish, stock))
        .map(|dish| dish.name.clone())
        .collect()
}

/// True if at least one dish in any slot can be cooked.
pub fn has_available_meals(menu: &FoodMenu, stock: &Stock) -> bool {
    menu.iter()
        .any(|(_, dishes)| dishes.iter().any(|dish| is_available(dish, stock)))
}
