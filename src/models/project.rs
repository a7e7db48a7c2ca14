use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::{non_negative, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub client_id: Uuid,
    pub name: String,
    pub service_address: Address,
    pub budget: f64,
    #[serde(default)]
    pub actual_cost: f64,
    pub status: ProjectStatus,
    #[serde(default)]
    pub completion_percentage: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Entity for Project {
    const COLLECTION: &'static str = "projects";
    const LABEL: &'static str = "Project";
}

impl Project {
    pub fn remaining_budget(&self) -> f64 {
        self.budget - self.actual_cost
    }

    /// Normalizes and checks the numeric fields. Completed projects are
    /// always at 100%.
    pub fn validate(&mut self) -> Result<(), AppError> {
        if self.service_address.street.trim().is_empty() {
            return Err(AppError::validation("Service address is required"));
        }
        non_negative(self.budget, "Budget")?;
        non_negative(self.actual_cost, "Actual cost")?;
        if self.status == ProjectStatus::Completed {
            self.completion_percentage = 100.0;
        }
        if !(0.0..=100.0).contains(&self.completion_percentage) {
            return Err(AppError::validation("Completion percentage must be between 0 and 100"));
        }
        Ok(())
    }

    pub fn record_cost(&mut self, amount: f64) -> Result<(), AppError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(AppError::validation("Cost amount must be positive"));
        }
        self.actual_cost += amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        Project {
            client_id: Uuid::now_v7(),
            name: "Kitchen remodel".into(),
            service_address: Address { street: "12 Elm St".into(), ..Default::default() },
            budget: 20_000.0,
            actual_cost: 0.0,
            status: ProjectStatus::InProgress,
            completion_percentage: 40.0,
            notes: None,
        }
    }

    #[test]
    fn completion_must_be_a_percentage() {
        let mut p = project();
        p.completion_percentage = 101.0;
        assert!(p.validate().is_err());
        p.completion_percentage = -1.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn completed_forces_full_completion() {
        let mut p = project();
        p.status = ProjectStatus::Completed;
        p.validate().unwrap();
        assert_eq!(p.completion_percentage, 100.0);
    }

    #[test]
    fn costs_reduce_remaining_budget() {
        let mut p = project();
        p.record_cost(1500.0).unwrap();
        p.record_cost(500.0).unwrap();
        assert_eq!(p.remaining_budget(), 18_000.0);
        assert!(p.record_cost(0.0).is_err());
    }
}
