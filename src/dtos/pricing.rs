use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePricingRequest {
    pub default_tax_rate: Option<f64>,
    pub default_markup_percent: Option<f64>,
    pub default_hourly_rate: Option<f64>,
}
