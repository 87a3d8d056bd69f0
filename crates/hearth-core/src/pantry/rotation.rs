//! Round-robin meal rotation over the currently cookable dishes.

use super::availability::available_dishes;
use super::model::{FoodMenu, MealType, Stock};

/// Next cookable dish after `current` in `meal`.
///
/// The cursor is re-derived from `current` on every call: if `current` is
/// no longer cookable (or unknown) the first cookable dish is returned.
/// With nothing cookable, `current` comes back unchanged.
pub fn rotate_meal(current: &str, menu: &FoodMenu, stock: &Stock, meal: MealType) -> String {
    let available = available_dishes(menu, stock, meal);
    if available.is_empty() {
        return current.to_string();
    }
    let next = match available.iter().position(|name| name == current) {
        Some(index) => (index + 1) % available.len(),
        None => 0,
    };
    available[next].clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pantry::model::{Dish, StockCategory, StockItem};

    fn setup() -> (FoodMenu, Stock) {
        let mut stock = Stock::default();
        stock.upsert(StockCategory::Groceries, "wheat", StockItem::new("kg", 2.0));
        stock.upsert(StockCategory::Groceries, "poha", StockItem::new("kg", 1.0));

        let mut menu = FoodMenu::default();
        menu.breakfast = vec![
            Dish::new("Wheat Dosa").with_ingredient("wheat", "1 medium"),
            Dish::new("Idli").with_ingredient("rava", "1 small"),
            Dish::new("Poha").with_ingredient("poha", "1 medium"),
            Dish::new("Upma").with_ingredient("wheat", "2 small"),
        ];
        (menu, stock)
    }

    #[test]
    fn skips_unavailable_dishes() {
        let (menu, stock) = setup();
        assert_eq!(rotate_meal("Wheat Dosa", &menu, &stock, MealType::Breakfast), "Poha");
        assert_eq!(rotate_meal("Poha", &menu, &stock, MealType::Breakfast), "Upma");
        assert_eq!(rotate_meal("Upma", &menu, &stock, MealType::Breakfast), "Wheat Dosa");
    }

    #[test]
    fn unknown_current_restarts_cycle() {
        let (menu, stock) = setup();
        assert_eq!(rotate_meal("Idli", &menu, &stock, MealType::Breakfast), "Wheat Dosa");
        assert_eq!(rotate_meal("Pizza", &menu, &stock, MealType::Breakfast), "Wheat Dosa");
    }

    #[test]
    fn empty_slot_is_a_no_op() {
        let (menu, stock) = setup();
        assert_eq!(rotate_meal("Tea", &menu, &stock, MealType::Snacks), "Tea");
        assert_eq!(
            rotate_meal("Wheat Dosa", &menu, &Stock::default(), MealType::Breakfast),
            "Wheat Dosa"
        );
    }
}
