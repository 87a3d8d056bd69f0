//! Protein and fiber tracking for daily menus.

use serde::{Deserialize, Serialize};

use super::model::{DailyMenu, Dish, FoodMenu, Nutrition};
use crate::storage::NutritionGoals;

/// Whose goals a summary is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Person {
    User,
    Spouse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionSummary {
    pub total_protein: f64,
    pub total_fiber: f64,
    pub protein_goal: f64,
    pub fiber_goal: f64,
    /// Percent of goal, capped at 100.
    pub protein_progress: f64,
    pub fiber_progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutritionLevel {
    Low,
    Good,
    High,
}

impl NutritionLevel {
    pub fn from_progress(progress: f64) -> Self {
        if progress < 70.0 {
            NutritionLevel::Low
        } else if progress <= 110.0 {
            NutritionLevel::Good
        } else {
            NutritionLevel::High
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            NutritionLevel::Low => "Below target",
            NutritionLevel::Good => "On track",
            NutritionLevel::High => "Above target",
        }
    }
}

/// Sum of the nutrition of every planned dish found in the food menu.
/// Names that match no dish (placeholders, deleted recipes) count as zero.
pub fn menu_nutrition(menu: &DailyMenu, food: &FoodMenu) -> Nutrition {
    menu.dishes()
        .iter()
        .filter_map(|name| food.find_any(name))
        .fold(Nutrition::default(), |acc, dish| Nutrition {
            protein: acc.protein + dish.nutrition.protein,
            fiber: acc.fiber + dish.nutrition.fiber,
        })
}

fn progress(total: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        return 100.0;
    }
    (total / goal * 100.0).min(100.0)
}

pub fn summary(
    menu: &DailyMenu,
    food: &FoodMenu,
    goals: &NutritionGoals,
    person: Person,
) -> NutritionSummary {
    let totals = menu_nutrition(menu, food);
    let (protein_goal, fiber_goal) = match person {
        Person::User => (goals.user_protein, goals.user_fiber),
        Person::Spouse => (goals.spouse_protein, goals.spouse_fiber),
    };
    NutritionSummary {
        total_protein: totals.protein,
        total_fiber: totals.fiber,
        protein_goal,
        fiber_goal,
        protein_progress: progress(totals.protein, protein_goal),
        fiber_progress: progress(totals.fiber, fiber_goal),
    }
}

/// Plain-language hints for a summary.
///
/// Progress is capped at 100, so the "too much protein" hint only shows
/// for summaries built by hand with uncapped progress.
pub fn suggestions(summary: &NutritionSummary) -> Vec<&'static str> {
    let mut out = Vec::new();
    if summary.protein_progress < 80.0 {
        out.push("Consider adding more protein-rich foods like dal, nuts, or yogurt");
    }
    if summary.fiber_progress < 80.0 {
        out.push("Add more fiber-rich foods like vegetables, fruits, or whole grains");
    }
    if summary.protein_progress > 120.0 {
        out.push("You might be consuming too much protein. Consider balancing with other nutrients");
    }
    if summary.total_protein < 30.0 {
        out.push("Your protein intake is quite low. Try to include protein in every meal");
    }
    if summary.total_fiber < 15.0 {
        out.push("Your fiber intake could be improved. Add more vegetables and fruits");
    }
    out
}

/// Average daily totals over `menus`, rounded to one decimal.
pub fn weekly_average(menus: &[DailyMenu], food: &FoodMenu) -> Nutrition {
    if menus.is_empty() {
        return Nutrition::default();
    }
    let total = menus
        .iter()
        .map(|m| menu_nutrition(m, food))
        .fold(Nutrition::default(), |acc, n| Nutrition {
            protein: acc.protein + n.protein,
            fiber: acc.fiber + n.fiber,
        });
    let n = menus.len() as f64;
    Nutrition {
        protein: (total.protein / n * 10.0).round() / 10.0,
        fiber: (total.fiber / n * 10.0).round() / 10.0,
    }
}

/// Dishes with at least `min_protein` grams of protein, richest first.
pub fn protein_rich_dishes(food: &FoodMenu, min_protein: f64) -> Vec<&Dish> {
    let mut dishes: Vec<&Dish> = food
        .iter()
        .flat_map(|(_, dishes)| dishes.iter())
        .filter(|d| d.nutrition.protein >= min_protein)
        .collect();
    dishes.sort_by(|a, b| b.nutrition.protein.total_cmp(&a.nutrition.protein));
    dishes
}

/// Dishes with at least `min_fiber` grams of fiber, richest first.
pub fn fiber_rich_dishes(food: &FoodMenu, min_fiber: f64) -> Vec<&Dish> {
    let mut dishes: Vec<&Dish> = food
        .iter()
        .flat_map(|(_, dishes)| dishes.iter())
        .filter(|d| d.nutrition.fiber >= min_fiber)
        .collect();
    dishes.sort_by(|a, b| b.nutrition.fiber.total_cmp(&a.nutrition.fiber));
    dishes
}
