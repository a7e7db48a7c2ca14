// src/dtos/product.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::category::{CategoryLevel, CategorySelection};
use crate::models::product::{Product, StorePrice};
use crate::services::Record;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct StockInput {
    #[serde(default)]
    pub on_hand: f64,
    #[serde(default)]
    pub assigned: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub brand_id: Option<Uuid>,
    pub unit: Option<String>,
    #[serde(default)]
    pub classification: CategorySelection,
    #[serde(default)]
    pub store_prices: Vec<StorePrice>,
    pub stock: Option<StockInput>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand_id: Option<Uuid>,
    pub unit: Option<String>,
    /// Levels to change; a changed level drops the levels below it.
    pub classification: Option<CategorySelection>,
    /// Clears this level and everything below it before applying changes.
    pub clear_classification_from: Option<CategoryLevel>,
    pub stock: Option<StockInput>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    #[serde(default)]
    pub on_hand_delta: f64,
    #[serde(default)]
    pub assigned_delta: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpsertStorePriceRequest {
    pub sku: String,
    pub price: f64,
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub trade: Option<Uuid>,
    pub section: Option<Uuid>,
    pub category: Option<Uuid>,
    pub subcategory: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: Option<Uuid>,
    pub size: Option<Uuid>,
    pub search: Option<String>,
}

impl ProductQuery {
    pub fn classification(&self) -> CategorySelection {
        CategorySelection {
            trade: self.trade,
            section: self.section,
            category: self.category,
            subcategory: self.subcategory,
            kind: self.kind,
            size: self.size,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StockView {
    pub on_hand: f64,
    pub assigned: f64,
    pub available: f64,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub brand_id: Option<Uuid>,
    pub unit: String,
    pub classification: CategorySelection,
    pub store_prices: Vec<StorePrice>,
    pub best_price: Option<f64>,
    pub stock: StockView,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Convert from Model to Response DTO
impl From<Record<Product>> for ProductResponse {
    fn from(record: Record<Product>) -> Self {
        let product = record.data;
        Self {
            id: record.id,
            best_price: product.best_price().map(|p| p.price),
            stock: StockView {
                on_hand: product.stock.on_hand,
                assigned: product.stock.assigned,
                available: product.stock.available(),
            },
            name: product.name,
            description: product.description,
            brand_id: product.brand_id,
            unit: product.unit,
            classification: product.classification,
            store_prices: product.store_prices,
            image_url: product.image_url,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
