use serde::{Deserialize, Serialize};

use super::model::{Stock, StockCategory, StockItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in-stock",
            StockStatus::LowStock => "low-stock",
            StockStatus::OutOfStock => "out-of-stock",
        }
    }

    /// Low or out of stock.
    pub fn needs_restock(&self) -> bool {
        !matches!(self, StockStatus::InStock)
    }
}

/// Classify an item. Zero quantity is out-of-stock whatever the threshold.
pub fn classify(item: &StockItem) -> StockStatus {
    if item.quantity == 0.0 {
        return StockStatus::OutOfStock;
    }
    match item.threshold {
        Some(threshold) if item.quantity <= threshold => StockStatus::LowStock,
        _ => StockStatus::InStock,
    }
}

/// A stock item that needs restocking, with its partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockItem {
    pub name: String,
    pub category: StockCategory,
    pub status: StockStatus,
    pub quantity: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

/// Items that are low or out of stock, groceries first.
pub fn low_stock_items(stock: &Stock) -> Vec<LowStockItem> {
    stock
        .iter()
        .filter_map(|(category, name, item)| {
            let status = classify(item);
            status.needs_restock().then(|| LowStockItem {
                name: name.to_string(),
                category,
                status,
                quantity: item.quantity,
                unit: item.unit.clone(),
                threshold: item.threshold,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_out_of_stock_even_with_threshold() {
        let item = StockItem::new("kg", 0.0).with_threshold(1.0);
        assert_eq!(classify(&item), StockStatus::OutOfStock);
    }

    #[test]
    fn threshold_is_inclusive() {
        let item = StockItem::new("kg", 1.0).with_threshold(1.0);
        assert_eq!(classify(&item), StockStatus::LowStock);
        let item = StockItem::new("kg", 1.01).with_threshold(1.0);
        assert_eq!(classify(&item), StockStatus::InStock);
    }

    #[test]
    fn no_threshold_never_low() {
        assert_eq!(classify(&StockItem::new("kg", 0.001)), StockStatus::InStock);
    }

    #[test]
    fn low_items_list_groceries_first() {
        let mut stock = Stock::default();
        stock.upsert(StockCategory::Vegetables, "onion", StockItem::new("kg", 0.0));
        stock.upsert(
            StockCategory::Groceries,
            "dal",
            StockItem::new("kg", 0.2).with_threshold(0.5),
        );
        stock.upsert(StockCategory::Groceries, "rice", StockItem::new("kg", 4.0));
        let names: Vec<_> = low_stock_items(&stock).into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["dal", "onion"]);
        assert_eq!(StockStatus::LowStock.as_str(), "low-stock");
    }
}
