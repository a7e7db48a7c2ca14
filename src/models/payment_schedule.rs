use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::round2;

/// Largest accepted gap between a schedule's sum and its target.
pub const SUM_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    /// Entry values are percentages of the total and sum to 100.
    Percentage,
    /// Entry values are currency amounts and sum to the total.
    Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEntry {
    pub label: String,
    pub value: f64,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub mode: ScheduleMode,
    pub entries: Vec<PaymentEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub label: String,
    pub amount: f64,
    pub due_date: Option<NaiveDate>,
}

impl PaymentSchedule {
    pub fn target(&self, total: f64) -> f64 {
        match self.mode {
            ScheduleMode::Percentage => 100.0,
            ScheduleMode::Amount => total,
        }
    }

    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|e| e.value).sum()
    }

    /// Accepts the schedule only when its entries add up to the target.
    pub fn validate(&self, total: f64) -> Result<(), AppError> {
        if self.entries.is_empty() {
            return Err(AppError::validation("Payment schedule needs at least one entry"));
        }
        for entry in &self.entries {
            if entry.label.trim().is_empty() {
                return Err(AppError::validation("Payment entries need a label"));
            }
            if !entry.value.is_finite() || entry.value <= 0.0 {
                return Err(AppError::validation("Payment entry values must be positive"));
            }
        }
        let target = self.target(total);
        let sum = self.sum();
        if (sum - target).abs() > SUM_TOLERANCE {
            let unit = match self.mode {
                ScheduleMode::Percentage => "%",
                ScheduleMode::Amount => "",
            };
            return Err(AppError::validation(format!(
                "Payment schedule sums to {sum:.2}{unit}, expected {target:.2}{unit}"
            )));
        }
        Ok(())
    }

    /// Splits `total` into cent amounts. The last entry takes the rounding
    /// remainder so the parts always add back to `total`.
    pub fn allocate(&self, total: f64) -> Vec<Allocation> {
        let total = round2(total);
        let mut allocated = 0.0;
        let last = self.entries.len().saturating_sub(1);
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let amount = if i == last {
                    round2(total - allocated)
                } else {
                    let share = match self.mode {
                        ScheduleMode::Percentage => total * entry.value / 100.0,
                        ScheduleMode::Amount => entry.value,
                    };
                    round2(share)
                };
                allocated += amount;
                Allocation { label: entry.label.clone(), amount, due_date: entry.due_date }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(mode: ScheduleMode, values: &[f64]) -> PaymentSchedule {
        PaymentSchedule {
            mode,
            entries: values
                .iter()
                .enumerate()
                .map(|(i, v)| PaymentEntry { label: format!("Payment {}", i + 1), value: *v, due_date: None })
                .collect(),
        }
    }

    #[test]
    fn percentages_must_sum_to_one_hundred() {
        assert!(schedule(ScheduleMode::Percentage, &[30.0, 40.0, 30.0]).validate(999.0).is_ok());
        assert!(schedule(ScheduleMode::Percentage, &[33.333, 33.333, 33.334]).validate(0.0).is_ok());
        assert!(schedule(ScheduleMode::Percentage, &[50.0, 40.0]).validate(1000.0).is_err());
        assert!(schedule(ScheduleMode::Percentage, &[50.0, 50.02]).validate(1000.0).is_err());
    }

    #[test]
    fn amounts_must_sum_to_the_total() {
        assert!(schedule(ScheduleMode::Amount, &[500.0, 250.5]).validate(750.5).is_ok());
        assert!(schedule(ScheduleMode::Amount, &[500.0, 250.5]).validate(750.509).is_ok());
        assert!(schedule(ScheduleMode::Amount, &[500.0, 250.0]).validate(750.5).is_err());
    }

    #[test]
    fn entries_are_checked() {
        assert!(schedule(ScheduleMode::Amount, &[]).validate(0.0).is_err());
        assert!(schedule(ScheduleMode::Percentage, &[110.0, -10.0]).validate(0.0).is_err());
        let mut blank = schedule(ScheduleMode::Percentage, &[100.0]);
        blank.entries[0].label = "  ".into();
        assert!(blank.validate(0.0).is_err());
    }

    #[test]
    fn allocation_adds_back_to_total() {
        for total in [100.0, 1000.01, 333.33, 12_345.67, 0.05] {
            let parts = schedule(ScheduleMode::Percentage, &[33.333, 33.333, 33.334]).allocate(total);
            let sum: f64 = parts.iter().map(|p| p.amount).sum();
            assert!((sum - total).abs() < 1e-9, "{sum} != {total}");
            for p in &parts {
                assert_eq!(round2(p.amount), p.amount);
            }
        }
    }

    #[test]
    fn allocation_by_percentage() {
        let parts = schedule(ScheduleMode::Percentage, &[25.0, 25.0, 50.0]).allocate(1000.0);
        let amounts: Vec<f64> = parts.iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![250.0, 250.0, 500.0]);
    }
}
