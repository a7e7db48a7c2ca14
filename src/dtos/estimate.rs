use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::estimate::{Attachment, CustomerInfo, Estimate, EstimateStatus, LineItemSource};
use crate::models::payment_schedule::{Allocation, PaymentSchedule};
use crate::services::Record;

/// A line item as submitted. Missing prices and descriptions are filled in
/// from the referenced product or labor item.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemInput {
    pub source: LineItemSource,
    pub description: Option<String>,
    pub quantity: f64,
    pub unit_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEstimateRequest {
    pub customer: CustomerInfo,
    #[serde(default)]
    pub line_items: Vec<LineItemInput>,
    pub tax_rate: Option<f64>,
    pub discount: Option<f64>,
    pub status: Option<EstimateStatus>,
    pub project_id: Option<Uuid>,
    pub notes: Option<String>,
    #[serde(default)]
    pub pictures: Vec<Attachment>,
    #[serde(default)]
    pub documents: Vec<Attachment>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEstimateRequest {
    pub customer: Option<CustomerInfo>,
    pub line_items: Option<Vec<LineItemInput>>,
    pub tax_rate: Option<f64>,
    pub discount: Option<f64>,
    pub project_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: EstimateStatus,
}

#[derive(Debug, Deserialize)]
pub struct ChangeOrderRequest {
    #[serde(default)]
    pub line_items: Vec<LineItemInput>,
    pub tax_rate: Option<f64>,
    pub discount: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AttachmentsRequest {
    #[serde(default)]
    pub pictures: Vec<Attachment>,
    #[serde(default)]
    pub documents: Vec<Attachment>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EstimateQuery {
    pub status: Option<EstimateStatus>,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    #[serde(flatten)]
    pub estimate: Record<Estimate>,
    /// Payment schedule split into amounts, when a schedule is set.
    pub payment_allocations: Option<Vec<Allocation>>,
}

impl From<Record<Estimate>> for EstimateResponse {
    fn from(estimate: Record<Estimate>) -> Self {
        let payment_allocations = estimate
            .data
            .payment_schedule
            .as_ref()
            .map(|s: &PaymentSchedule| s.allocate(estimate.data.totals.total));
        Self { estimate, payment_allocations }
    }
}
