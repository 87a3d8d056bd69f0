//! Daily menu plan: one chosen dish per slot per date.
//!
//! Menus are kept indefinitely. Rotation and cooking act on the plan
//! through the pantry engine so the chosen dish is always cookable.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::availability::{is_available, missing_ingredients};
use super::depletion::reduce_stock;
use super::model::{DailyMenu, FoodMenu, MealType, Stock};
use super::rotation::rotate_meal;
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuPlan {
    menus: Vec<DailyMenu>,
}

/// Result of a rotation, for logging and events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rotation {
    pub date: NaiveDate,
    pub meal: MealType,
    pub from: String,
    pub to: String,
}

impl MenuPlan {
    pub fn new(menus: Vec<DailyMenu>) -> Self {
        Self { menus }
    }

    /// Starter plan for a household with no saved menus.
    pub fn seeded(today: NaiveDate) -> Self {
        let tomorrow = today + Duration::days(1);
        Self {
            menus: vec![
                DailyMenu {
                    date: today,
                    breakfast: "Wheat Dosa".into(),
                    addons: "Coconut Chutney".into(),
                    lunch: "Rice & Dal".into(),
                    dinner: "Light Rice & Dal".into(),
                    snacks: "Tea & Biscuits".into(),
                },
                DailyMenu {
                    date: tomorrow,
                    breakfast: "Poha".into(),
                    addons: "Pickle".into(),
                    lunch: "Chapati & Sabzi".into(),
                    dinner: "Chapati & Light Curry".into(),
                    snacks: "Fruits".into(),
                },
            ],
        }
    }

    pub fn menus(&self) -> &[DailyMenu] {
        &self.menus
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyMenu> {
        self.menus.iter().find(|m| m.date == date)
    }

    /// The menu for `date`, or the "nothing planned" placeholder.
    pub fn menu_for(&self, date: NaiveDate) -> DailyMenu {
        self.get(date)
            .cloned()
            .unwrap_or_else(|| DailyMenu::unplanned(date))
    }

    /// Make sure today and tomorrow have entries.
    ///
    /// An empty plan gets the seeded starter menus; otherwise missing days
    /// are added as placeholders. Returns true if anything was added.
    pub fn ensure_days(&mut self, today: NaiveDate) -> bool {
        if self.menus.is_empty() {
            *self = Self::seeded(today);
            return true;
        }
        let mut changed = false;
        for date in [today, today + Duration::days(1)] {
            if self.get(date).is_none() {
                self.menus.push(DailyMenu::unplanned(date));
                changed = true;
            }
        }
        changed
    }

    fn entry_mut(&mut self, date: NaiveDate) -> &mut DailyMenu {
        let index = match self.menus.iter().position(|m| m.date == date) {
            Some(index) => index,
            None => {
                self.menus.push(DailyMenu::unplanned(date));
                self.menus.len() - 1
            }
        };
        &mut self.menus[index]
    }

    pub fn set_dish(&mut self, date: NaiveDate, meal: MealType, dish: impl Into<String>) {
        self.entry_mut(date).set_dish(meal, dish);
    }

    /// Advance `meal` on `date` to the next cookable dish.
    pub fn rotate(
        &mut self,
        date: NaiveDate,
        meal: MealType,
        food: &FoodMenu,
        stock: &Stock,
    ) -> Rotation {
        let entry = self.entry_mut(date);
        let from = entry.dish(meal).to_string();
        let to = rotate_meal(&from, food, stock, meal);
        entry.set_dish(meal, to.clone());
        debug!(%date, %meal, %from, %to, "rotated meal");
        Rotation {
            date,
            meal,
            from,
            to,
        }
    }
}

/// Mark `dish` from `meal` as cooked and return the depleted stock.
///
/// Refuses dishes that are not in the menu or cannot be cooked with the
/// current stock; the stock is untouched in both cases.
pub fn cook(
    food: &FoodMenu,
    stock: &Stock,
    meal: MealType,
    dish: &str,
) -> Result<Stock, ValidationError> {
    let recipe = food.find(meal, dish).ok_or_else(|| ValidationError::UnknownDish {
        meal: meal.to_string(),
        dish: dish.to_string(),
    })?;
    if !is_available(recipe, stock) {
        return Err(ValidationError::InsufficientIngredients {
            dish: dish.to_string(),
            missing: missing_ingredients(recipe, stock),
        });
    }
    info!(%meal, dish, "dish cooked, stock reduced");
    Ok(reduce_stock(stock, recipe))
}
