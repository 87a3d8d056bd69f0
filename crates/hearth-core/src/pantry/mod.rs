//! Stock-aware menu engine.
//!
//! - [`amount`]: free-text ingredient amounts to stock units
//! - [`availability`]: cookability checks and deficiency reports
//! - [`depletion`]: pure stock reduction after cooking
//! - [`rotation`]: round-robin over cookable dishes
//! - [`status`]: in/low/out-of-stock classification
//! - [`plan`]: dated daily menus, rotate and cook actions
//! - [`restock`]: "nothing left to cook" alerting
//! - [`nutrition`]: protein/fiber totals against household goals

pub mod amount;
pub mod availability;
pub mod depletion;
pub mod model;
pub mod nutrition;
pub mod plan;
pub mod restock;
pub mod rotation;
pub mod status;

pub use amount::required_amount;
pub use availability::{
    all_missing_ingredients, available_dishes, deficiencies, has_available_meals, is_available,
    missing_ingredients, missing_item_names, Deficiency, DishShortage,
};
pub use depletion::reduce_stock;
pub use model::{
    DailyMenu, Dish, FoodMenu, MealType, Nutrition, Stock, StockCategory, StockEntry, StockItem,
};
pub use plan::{cook, MenuPlan, Rotation};
pub use restock::{RestockAlert, RestockMonitor};
pub use rotation::rotate_meal;
pub use status::{classify, low_stock_items, LowStockItem, StockStatus};
