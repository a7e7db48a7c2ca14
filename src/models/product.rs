use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::category::CategorySelection;
use crate::services::Entity;

/// A store-specific listing of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorePrice {
    pub store_id: Uuid,
    pub sku: String,
    pub price: f64,
    #[serde(default)]
    pub url: Option<String>,
}

/// Stock counts. `available` is always derived, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub on_hand: f64,
    pub assigned: f64,
}

impl Stock {
    pub fn new(on_hand: f64, assigned: f64) -> Result<Self, AppError> {
        if !on_hand.is_finite() || !assigned.is_finite() {
            return Err(AppError::validation("Stock quantities must be numbers"));
        }
        if on_hand < 0.0 {
            return Err(AppError::validation("On-hand quantity cannot be negative"));
        }
        if assigned < 0.0 {
            return Err(AppError::validation("Assigned quantity cannot be negative"));
        }
        if assigned > on_hand {
            return Err(AppError::validation("Assigned quantity cannot exceed on-hand quantity"));
        }
        Ok(Self { on_hand, assigned })
    }

    pub fn available(&self) -> f64 {
        self.on_hand - self.assigned
    }

    /// Applies both deltas at once; the result must still be a valid stock.
    pub fn adjust(&self, on_hand_delta: f64, assigned_delta: f64) -> Result<Self, AppError> {
        Self::new(self.on_hand + on_hand_delta, self.assigned + assigned_delta)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub brand_id: Option<Uuid>,
    pub unit: String,
    #[serde(default)]
    pub classification: CategorySelection,
    #[serde(default)]
    pub store_prices: Vec<StorePrice>,
    #[serde(default)]
    pub stock: Stock,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Entity for Product {
    const COLLECTION: &'static str = "products";
    const LABEL: &'static str = "Product";
}

impl Product {
    /// Lowest listed price across stores.
    pub fn best_price(&self) -> Option<&StorePrice> {
        self.store_prices
            .iter()
            .min_by(|a, b| a.price.total_cmp(&b.price))
    }

    /// Inserts or replaces the listing for `price.store_id`.
    pub fn upsert_store_price(&mut self, price: StorePrice) {
        match self.store_prices.iter_mut().find(|p| p.store_id == price.store_id) {
            Some(existing) => *existing = price,
            None => self.store_prices.push(price),
        }
    }

    pub fn remove_store_price(&mut self, store_id: Uuid) -> bool {
        let before = self.store_prices.len();
        self.store_prices.retain(|p| p.store_id != store_id);
        self.store_prices.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            name: "2x4 Stud".into(),
            description: None,
            brand_id: None,
            unit: "ea".into(),
            classification: CategorySelection::default(),
            store_prices: Vec::new(),
            stock: Stock::default(),
            image_url: None,
        }
    }

    #[test]
    fn available_is_on_hand_minus_assigned() {
        for (on_hand, assigned) in [(0.0, 0.0), (10.0, 3.0), (7.5, 7.5), (120.0, 0.25)] {
            let stock = Stock::new(on_hand, assigned).unwrap();
            assert_eq!(stock.available(), on_hand - assigned);
        }
    }

    #[test]
    fn invalid_stock_is_rejected() {
        assert!(Stock::new(-1.0, 0.0).is_err());
        assert!(Stock::new(5.0, -1.0).is_err());
        assert!(Stock::new(5.0, 6.0).is_err());
        assert!(Stock::new(f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn adjust_keeps_invariants() {
        let stock = Stock::new(10.0, 2.0).unwrap();
        let adjusted = stock.adjust(5.0, 3.0).unwrap();
        assert_eq!(adjusted.on_hand, 15.0);
        assert_eq!(adjusted.available(), 10.0);

        assert!(stock.adjust(-9.0, 0.0).is_err());
        assert!(stock.adjust(0.0, -3.0).is_err());
    }

    #[test]
    fn store_prices_are_one_per_store() {
        let mut p = product();
        let depot = Uuid::now_v7();
        let lowes = Uuid::now_v7();
        p.upsert_store_price(StorePrice { store_id: depot, sku: "A1".into(), price: 4.25, url: None });
        p.upsert_store_price(StorePrice { store_id: lowes, sku: "B2".into(), price: 3.98, url: None });
        p.upsert_store_price(StorePrice { store_id: depot, sku: "A1".into(), price: 3.50, url: None });

        assert_eq!(p.store_prices.len(), 2);
        assert_eq!(p.best_price().unwrap().store_id, depot);
        assert_eq!(p.store_prices[1].sku, "B2");

        assert!(p.remove_store_price(depot));
        assert!(!p.remove_store_price(depot));
        assert_eq!(p.best_price().unwrap().price, 3.98);
    }
}
