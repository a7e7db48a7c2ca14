use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::category::CategorySelection;
use crate::services::{non_negative, round2, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    Flat,
    Hourly,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LaborPricing {
    #[serde(default)]
    pub flat_rate: Option<f64>,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
}

impl LaborPricing {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.flat_rate.is_none() && self.hourly_rate.is_none() {
            return Err(AppError::validation("A flat rate or an hourly rate is required"));
        }
        if let Some(rate) = self.flat_rate {
            non_negative(rate, "Flat rate")?;
        }
        if let Some(rate) = self.hourly_rate {
            non_negative(rate, "Hourly rate")?;
        }
        if let Some(hours) = self.estimated_hours {
            non_negative(hours, "Estimated hours")?;
        }
        Ok(())
    }

    /// Price for one unit of work. Hourly pricing uses `hours`, falling back
    /// to the estimate, then to one hour.
    pub fn price(&self, mode: PricingMode, hours: Option<f64>) -> Result<f64, AppError> {
        match mode {
            PricingMode::Flat => self
                .flat_rate
                .ok_or_else(|| AppError::validation("Labor item has no flat rate")),
            PricingMode::Hourly => {
                let rate = self
                    .hourly_rate
                    .ok_or_else(|| AppError::validation("Labor item has no hourly rate"))?;
                let hours = hours.or(self.estimated_hours).unwrap_or(1.0);
                Ok(round2(rate * non_negative(hours, "Hours")?))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborTask {
    pub id: Uuid,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaborItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub classification: CategorySelection,
    pub pricing: LaborPricing,
    /// Checklist, in display order.
    #[serde(default)]
    pub tasks: Vec<LaborTask>,
}

impl Entity for LaborItem {
    const COLLECTION: &'static str = "labor_items";
    const LABEL: &'static str = "Labor item";
}

impl LaborItem {
    pub fn add_task(&mut self, description: &str) -> Result<&LaborTask, AppError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(AppError::validation("Task description is required"));
        }
        self.tasks.push(LaborTask { id: Uuid::now_v7(), description: description.to_string() });
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    pub fn remove_task(&mut self, task_id: Uuid) -> Result<(), AppError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != task_id);
        if self.tasks.len() == before {
            return Err(AppError::not_found("Task not found"));
        }
        Ok(())
    }

    /// Reorders the checklist. `order` must name every task exactly once.
    pub fn reorder_tasks(&mut self, order: &[Uuid]) -> Result<(), AppError> {
        if order.len() != self.tasks.len() {
            return Err(AppError::validation("Task order must list every task exactly once"));
        }
        let mut remaining = self.tasks.clone();
        let mut reordered = Vec::with_capacity(order.len());
        for id in order {
            let pos = remaining
                .iter()
                .position(|t| t.id == *id)
                .ok_or_else(|| AppError::validation("Task order must list every task exactly once"))?;
            reordered.push(remaining.swap_remove(pos));
        }
        self.tasks = reordered;
        Ok(())
    }
}
