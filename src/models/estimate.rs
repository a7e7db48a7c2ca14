use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::labor::PricingMode;
use crate::models::payment_schedule::PaymentSchedule;
use crate::services::{non_negative, round2, Entity};

/// States of one estimate lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateStatus {
    Draft,
    Estimate,
    Invoice,
    ChangeOrder,
}

impl EstimateStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EstimateStatus::Draft => "draft",
            EstimateStatus::Estimate => "estimate",
            EstimateStatus::Invoice => "invoice",
            EstimateStatus::ChangeOrder => "change_order",
        }
    }

    /// Draft -> Estimate -> Invoice; change orders only become invoices.
    pub fn can_transition_to(self, next: EstimateStatus) -> bool {
        use EstimateStatus::*;
        matches!(
            (self, next),
            (Draft, Estimate) | (Draft, Invoice) | (Estimate, Invoice) | (ChangeOrder, Invoice)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default)]
    pub client_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Where a line item's price came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineItemSource {
    Product { product_id: Uuid },
    Labor { labor_item_id: Uuid, mode: PricingMode },
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: Uuid,
    pub source: LineItemSource,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
}

impl LineItem {
    pub fn new(source: LineItemSource, description: &str, quantity: f64, unit_price: f64) -> Result<Self, AppError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(AppError::validation("Line item description is required"));
        }
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(AppError::validation("Line item quantity must be positive"));
        }
        let unit_price = non_negative(unit_price, "Unit price")?;
        Ok(Self {
            id: Uuid::now_v7(),
            source,
            description: description.to_string(),
            quantity,
            unit_price,
            total: round2(quantity * unit_price),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: f64,
    pub discount: f64,
    pub tax: f64,
    pub total: f64,
}

impl Totals {
    /// Discount is clamped to the subtotal; tax applies after discount.
    pub fn compute(items: &[LineItem], tax_rate: f64, discount: f64) -> Self {
        let subtotal = round2(items.iter().map(|i| i.total).sum());
        let discount = round2(discount.clamp(0.0, subtotal));
        let taxable = subtotal - discount;
        let tax = round2(taxable * tax_rate / 100.0);
        Self { subtotal, discount, tax, total: round2(taxable + tax) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Estimate {
    pub number: u32,
    pub customer: CustomerInfo,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub pictures: Vec<Attachment>,
    #[serde(default)]
    pub documents: Vec<Attachment>,
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub totals: Totals,
    pub status: EstimateStatus,
    #[serde(default)]
    pub parent_estimate_id: Option<Uuid>,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub payment_schedule: Option<PaymentSchedule>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Entity for Estimate {
    const COLLECTION: &'static str = "estimates";
    const LABEL: &'static str = "Estimate";
}

impl Estimate {
    pub fn recompute_totals(&mut self) {
        self.totals = Totals::compute(&self.line_items, self.tax_rate, self.discount);
    }

    pub fn is_locked(&self) -> bool {
        self.status == EstimateStatus::Invoice
    }
}
