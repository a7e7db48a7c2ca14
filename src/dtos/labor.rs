use serde::Deserialize;
use uuid::Uuid;

use crate::models::category::{CategoryLevel, CategorySelection};
use crate::models::labor::LaborPricing;

#[derive(Debug, Deserialize)]
pub struct CreateLaborItemRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub classification: CategorySelection,
    pub pricing: LaborPricing,
    /// Checklist entries, in order.
    #[serde(default)]
    pub tasks: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateLaborItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub classification: Option<CategorySelection>,
    pub clear_classification_from: Option<CategoryLevel>,
    pub pricing: Option<LaborPricing>,
}

#[derive(Debug, Deserialize)]
pub struct AddTaskRequest {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ReorderTasksRequest {
    pub order: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LaborQuery {
    pub trade: Option<Uuid>,
    pub section: Option<Uuid>,
    pub category: Option<Uuid>,
    pub search: Option<String>,
}

impl LaborQuery {
    pub fn classification(&self) -> CategorySelection {
        CategorySelection {
            trade: self.trade,
            section: self.section,
            category: self.category,
            ..Default::default()
        }
    }
}
