use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::{non_negative, round2, Entity};

/// Per-user pricing defaults applied when estimates are built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingSettings {
    #[serde(default)]
    pub default_tax_rate: f64,
    #[serde(default)]
    pub default_markup_percent: f64,
    #[serde(default)]
    pub default_hourly_rate: f64,
}

impl Entity for PricingSettings {
    const COLLECTION: &'static str = "pricing";
    const LABEL: &'static str = "Pricing settings";
}

impl PricingSettings {
    pub fn validate(&self) -> Result<(), AppError> {
        non_negative(self.default_tax_rate, "Tax rate")?;
        non_negative(self.default_markup_percent, "Markup")?;
        non_negative(self.default_hourly_rate, "Hourly rate")?;
        Ok(())
    }

    /// Cost plus the default markup, in cents.
    pub fn marked_up(&self, cost: f64) -> f64 {
        round2(cost * (1.0 + self.default_markup_percent / 100.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_is_applied_to_cost() {
        let settings = PricingSettings { default_markup_percent: 25.0, ..Default::default() };
        assert_eq!(settings.marked_up(10.0), 12.5);
        assert_eq!(PricingSettings::default().marked_up(3.99), 3.99);
    }

    #[test]
    fn negative_values_rejected() {
        let settings = PricingSettings { default_tax_rate: -1.0, ..Default::default() };
        assert!(settings.validate().is_err());
        assert!(PricingSettings::default().validate().is_ok());
    }
}
