//! Edge-triggered restock alerting.
//!
//! An alert is raised only when the household goes from "some meal can be
//! cooked" to "no meal can be cooked". Staying empty does not re-alert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::availability::{all_missing_ingredients, has_available_meals, missing_item_names};
use super::model::{FoodMenu, Stock};
use crate::announce;
use crate::tasks::Task;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestockAlert {
    /// Unique missing ingredient names, in menu order.
    pub missing_items: Vec<String>,
    pub voice_text: String,
    pub telegram_text: String,
    /// One urgent shopping task per missing item.
    pub shopping_tasks: Vec<Task>,
}

/// Remembers whether meals were cookable at the previous check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockMonitor {
    previously_available: bool,
}

impl Default for RestockMonitor {
    fn default() -> Self {
        Self {
            previously_available: true,
        }
    }
}

impl RestockMonitor {
    pub fn new(previously_available: bool) -> Self {
        Self {
            previously_available,
        }
    }

    pub fn previously_available(&self) -> bool {
        self.previously_available
    }

    /// Re-baseline without alerting, e.g. on startup.
    pub fn reset(&mut self, available: bool) {
        self.previously_available = available;
    }

    /// Evaluate the stock and return an alert on the available -> none edge.
    pub fn check(&mut self, food: &FoodMenu, stock: &Stock, now: DateTime<Utc>) -> Option<RestockAlert> {
        let available = has_available_meals(food, stock);
        let fire = self.previously_available && !available;
        self.previously_available = available;
        if !fire {
            return None;
        }

        let missing_items = missing_item_names(&all_missing_ingredients(food, stock));
        warn!(count = missing_items.len(), "critical stock: no meal can be prepared");
        let shopping_tasks = missing_items
            .iter()
            .map(|item| Task::urgent_purchase(item, now))
            .collect();
        Some(RestockAlert {
            voice_text: announce::content::critical_restock(&missing_items),
            telegram_text: announce::telegram::critical_restock(&missing_items),
            missing_items,
            shopping_tasks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pantry::model::{Dish, StockCategory, StockItem};
    use crate::pantry::depletion::reduce_stock;

    fn kitchen() -> (FoodMenu, Stock) {
        let mut food = FoodMenu::default();
        food.lunch.push(Dish::new("Rice").with_ingredient("rice", "500g"));
        food.dinner.push(Dish::new("Dal").with_ingredient("dal", "100g"));
        let mut stock = Stock::default();
        stock.upsert(StockCategory::Groceries, "rice", StockItem::new("kg", 0.5));
        (food, stock)
    }

    #[test]
    fn alerts_once_on_falling_edge() {
        let (food, stock) = kitchen();
        let now = Utc::now();
        let mut monitor = RestockMonitor::default();
        assert!(monitor.check(&food, &stock, now).is_none());

        let empty = reduce_stock(&stock, food.find_any("Rice").unwrap());
        let alert = monitor.check(&food, &empty, now).expect("alert on edge");
        assert_eq!(alert.missing_items, vec!["rice", "dal"]);
        assert_eq!(alert.shopping_tasks.len(), 2);
        assert!(alert.voice_text.contains("rice, dal"));
        assert!(alert.telegram_text.contains("• dal"));

        assert!(monitor.check(&food, &empty, now).is_none());
        assert!(!monitor.previously_available());

        // Restocking re-arms the edge.
        assert!(monitor.check(&food, &stock, now).is_none());
        assert!(monitor.check(&food, &empty, now).is_some());
    }

    #[test]
    fn reset_suppresses_startup_alert() {
        let (food, _) = kitchen();
        let mut monitor = RestockMonitor::default();
        monitor.reset(false);
        assert!(monitor.check(&food, &Stock::default(), Utc::now()).is_none());
    }
}
