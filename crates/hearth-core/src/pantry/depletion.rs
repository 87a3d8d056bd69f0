//! Stock depletion after cooking a dish.

use super::amount::required_amount;
use super::model::{Dish, Stock};

/// Return a copy of `stock` with every ingredient of `dish` deducted.
///
/// Quantities floor at zero. Ingredients without a stock entry are skipped.
/// Callers gate on [`is_available`](super::availability::is_available) first;
/// this function never fails.
pub fn reduce_stock(stock: &Stock, dish: &Dish) -> Stock {
    let mut next = stock.clone();
    for (ingredient, amount) in &dish.ingredients {
        if let Some(item) = next.lookup_mut(ingredient) {
            let used = required_amount(amount, &item.unit);
            item.quantity = (item.quantity - used).max(0.0);
        }
    }
    next
}
