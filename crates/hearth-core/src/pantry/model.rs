//! Pantry data model: dishes, food menu, stock partitions and daily menus.
//!
//! JSON field names match the household data files (`food_menu.json`,
//! `stock.json`, `daily_menus`) so existing data round-trips unchanged.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One of the five fixed meal slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Addons,
    Lunch,
    Dinner,
    Snacks,
}

impl MealType {
    /// All slots in display order.
    pub const ALL: [MealType; 5] = [
        MealType::Breakfast,
        MealType::Addons,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snacks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Addons => "addons",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snacks => "snacks",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Addons => "Add-ons",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snacks => "Snacks",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "addons" | "add-ons" | "addon" => Ok(MealType::Addons),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snacks" | "snack" => Ok(MealType::Snacks),
            other => Err(ValidationError::UnknownMealType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Nutrition {
    pub protein: f64,
    pub fiber: f64,
}

/// A named recipe. Ingredient amounts are free text ("2 tbsp", "100g").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    pub name: String,
    #[serde(default)]
    pub ingredients: IndexMap<String, String>,
    #[serde(default)]
    pub nutrition: Nutrition,
}

impl Dish {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ingredients: IndexMap::new(),
            nutrition: Nutrition::default(),
        }
    }

    /// Builder-style ingredient insertion.
    pub fn with_ingredient(mut self, name: impl Into<String>, amount: impl Into<String>) -> Self {
        self.ingredients.insert(name.into(), amount.into());
        self
    }

    pub fn with_nutrition(mut self, protein: f64, fiber: f64) -> Self {
        self.nutrition = Nutrition { protein, fiber };
        self
    }
}

/// The recipe book: an ordered list of dishes per meal slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FoodMenu {
    #[serde(default)]
    pub breakfast: Vec<Dish>,
    #[serde(default)]
    pub addons: Vec<Dish>,
    #[serde(default)]
    pub lunch: Vec<Dish>,
    #[serde(default)]
    pub dinner: Vec<Dish>,
    #[serde(default)]
    pub snacks: Vec<Dish>,
}

impl FoodMenu {
    pub fn dishes(&self, meal: MealType) -> &[Dish] {
        match meal {
            MealType::Breakfast => &self.breakfast,
            MealType::Addons => &self.addons,
            MealType::Lunch => &self.lunch,
            MealType::Dinner => &self.dinner,
            MealType::Snacks => &self.snacks,
        }
    }

    pub fn dishes_mut(&mut self, meal: MealType) -> &mut Vec<Dish> {
        match meal {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Addons => &mut self.addons,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
            MealType::Snacks => &mut self.snacks,
        }
    }

    /// Find a dish by name within one slot.
    pub fn find(&self, meal: MealType, name: &str) -> Option<&Dish> {
        self.dishes(meal).iter().find(|d| d.name == name)
    }

    /// Find a dish by name in any slot, searching slots in display order.
    pub fn find_any(&self, name: &str) -> Option<&Dish> {
        MealType::ALL
            .iter()
            .find_map(|meal| self.find(*meal, name))
    }

    /// Iterate slots with their dishes in display order.
    pub fn iter(&self) -> impl Iterator<Item = (MealType, &[Dish])> {
        MealType::ALL.into_iter().map(move |meal| (meal, self.dishes(meal)))
    }
}

/// Which stock partition an ingredient lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockCategory {
    Groceries,
    Vegetables,
}

impl StockCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockCategory::Groceries => "groceries",
            StockCategory::Vegetables => "vegetables",
        }
    }
}

impl FromStr for StockCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groceries" | "grocery" => Ok(StockCategory::Groceries),
            "vegetables" | "vegetable" | "veg" => Ok(StockCategory::Vegetables),
            other => Err(ValidationError::InvalidValue {
                field: "category".into(),
                message: format!("expected groceries or vegetables, got '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub unit: String,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

impl StockItem {
    pub fn new(unit: impl Into<String>, quantity: f64) -> Self {
        Self {
            unit: unit.into(),
            quantity: quantity.max(0.0),
            threshold: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

/// A resolved stock lookup: the partition and the item found there.
#[derive(Debug, Clone, Copy)]
pub struct StockEntry<'a> {
    pub category: StockCategory,
    pub item: &'a StockItem,
}

/// On-hand quantities, split into two partitions keyed by ingredient name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stock {
    #[serde(default)]
    pub groceries: IndexMap<String, StockItem>,
    #[serde(default)]
    pub vegetables: IndexMap<String, StockItem>,
}

impl Stock {
    pub fn partition(&self, category: StockCategory) -> &IndexMap<String, StockItem> {
        match category {
            StockCategory::Groceries => &self.groceries,
            StockCategory::Vegetables => &self.vegetables,
        }
    }

    pub fn partition_mut(&mut self, category: StockCategory) -> &mut IndexMap<String, StockItem> {
        match category {
            StockCategory::Groceries => &mut self.groceries,
            StockCategory::Vegetables => &mut self.vegetables,
        }
    }

    /// Resolve an ingredient: groceries first, then vegetables.
    pub fn lookup(&self, ingredient: &str) -> Option<StockEntry<'_>> {
        if let Some(item) = self.groceries.get(ingredient) {
            return Some(StockEntry {
                category: StockCategory::Groceries,
                item,
            });
        }
        self.vegetables.get(ingredient).map(|item| StockEntry {
            category: StockCategory::Vegetables,
            item,
        })
    }

    /// Mutable counterpart of [`Stock::lookup`] with the same precedence.
    pub fn lookup_mut(&mut self, ingredient: &str) -> Option<&mut StockItem> {
        if self.groceries.contains_key(ingredient) {
            return self.groceries.get_mut(ingredient);
        }
        self.vegetables.get_mut(ingredient)
    }

    /// Insert or replace an item in `category`, removing any same-named
    /// entry from the other partition so a name lives in one place only.
    pub fn upsert(&mut self, category: StockCategory, name: impl Into<String>, item: StockItem) {
        let name = name.into();
        let other = match category {
            StockCategory::Groceries => StockCategory::Vegetables,
            StockCategory::Vegetables => StockCategory::Groceries,
        };
        self.partition_mut(other).shift_remove(&name);
        self.partition_mut(category).insert(name, item);
    }

    /// Reject an ingredient present in both partitions, or a quantity or
    /// threshold that is negative or not finite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = self
            .groceries
            .keys()
            .find(|name| self.vegetables.contains_key(*name))
        {
            return Err(ValidationError::PartitionCollision(name.clone()));
        }
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        for (_, name, item) in self.iter() {
            let bad = std::iter::once(item.quantity)
                .chain(item.threshold)
                .find(|v| !valid(*v));
            if let Some(value) = bad {
                return Err(ValidationError::InvalidQuantity {
                    name: name.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// Iterate every item, groceries first, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (StockCategory, &str, &StockItem)> {
        self.groceries
            .iter()
            .map(|(k, v)| (StockCategory::Groceries, k.as_str(), v))
            .chain(
                self.vegetables
                    .iter()
                    .map(|(k, v)| (StockCategory::Vegetables, k.as_str(), v)),
            )
    }

    pub fn len(&self) -> usize {
        self.groceries.len() + self.vegetables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groceries.is_empty() && self.vegetables.is_empty()
    }
}

/// The dish chosen for each slot on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMenu {
    pub date: NaiveDate,
    pub breakfast: String,
    pub addons: String,
    pub lunch: String,
    pub dinner: String,
    pub snacks: String,
}

impl DailyMenu {
    /// Placeholder menu used when nothing is planned for `date`.
    pub fn unplanned(date: NaiveDate) -> Self {
        Self {
            date,
            breakfast: "No meal planned".into(),
            addons: "No addon planned".into(),
            lunch: "No meal planned".into(),
            dinner: "No meal planned".into(),
            snacks: "No snack planned".into(),
        }
    }

    pub fn dish(&self, meal: MealType) -> &str {
        match meal {
            MealType::Breakfast => &self.breakfast,
            MealType::Addons => &self.addons,
            MealType::Lunch => &self.lunch,
            MealType::Dinner => &self.dinner,
            MealType::Snacks => &self.snacks,
        }
    }

    pub fn set_dish(&mut self, meal: MealType, name: impl Into<String>) {
        let slot = match meal {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Addons => &mut self.addons,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
            MealType::Snacks => &mut self.snacks,
        };
        *slot = name.into();
    }

    /// Dish names in slot order.
    pub fn dishes(&self) -> [&str; 5] {
        MealType::ALL.map(|meal| self.dish(meal))
    }
}
