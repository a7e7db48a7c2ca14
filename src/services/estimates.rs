//! Estimates, change orders and invoices.
//!
//! Writes here are not transactional: an estimate is created first and its
//! attachments are patched in by a later call, so a failure between the two
//! leaves an estimate without files.

use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::dtos::estimate::{
    AttachmentsRequest, ChangeOrderRequest, CreateEstimateRequest, EstimateQuery, LineItemInput,
    UpdateEstimateRequest,
};
use crate::error::AppError;
use crate::models::contact::Client;
use crate::models::estimate::{Attachment, CustomerInfo, Estimate, EstimateStatus, LineItem, LineItemSource, Totals};
use crate::models::labor::{LaborItem, PricingMode};
use crate::models::payment_schedule::PaymentSchedule;
use crate::models::pricing::PricingSettings;
use crate::models::product::Product;
use crate::models::project::Project;
use crate::services::pricing::PricingService;
use crate::services::{non_negative, required_name, Record, UserRepo};

pub struct EstimateService<'a> {
    repo: UserRepo<'a>,
}

fn check_attachments(attachments: &[Attachment]) -> Result<(), AppError> {
    for a in attachments {
        if a.url.trim().is_empty() {
            return Err(AppError::validation("Attachment URL is required"));
        }
        if a.name.trim().is_empty() {
            return Err(AppError::validation("Attachment name is required"));
        }
    }
    Ok(())
}

fn check_rate(tax_rate: f64, discount: f64) -> Result<(), AppError> {
    non_negative(tax_rate, "Tax rate")?;
    non_negative(discount, "Discount")?;
    Ok(())
}

impl<'a> EstimateService<'a> {
    pub fn new(repo: UserRepo<'a>) -> Self {
        Self { repo }
    }

    async fn settings(&self) -> Result<PricingSettings, AppError> {
        PricingService::new(self.repo).get().await
    }

    async fn next_number(&self) -> Result<u32, AppError> {
        let highest = self
            .repo
            .list::<Estimate>()
            .await?
            .iter()
            .map(|e| e.data.number)
            .max()
            .unwrap_or(0);
        Ok(highest + 1)
    }

    async fn check_customer(&self, customer: &mut CustomerInfo) -> Result<(), AppError> {
        customer.name = required_name(&customer.name, "Customer name")?;
        if let Some(client_id) = customer.client_id {
            if self.repo.get::<Client>(client_id).await?.is_none() {
                return Err(AppError::validation("Client not found"));
            }
        }
        Ok(())
    }

    async fn check_project(&self, project_id: Option<Uuid>) -> Result<(), AppError> {
        if let Some(id) = project_id {
            if self.repo.get::<Project>(id).await?.is_none() {
                return Err(AppError::validation("Project not found"));
            }
        }
        Ok(())
    }

    /// Resolves missing prices and descriptions from the referenced
    /// products and labor items.
    async fn build_line_items(
        &self,
        inputs: Vec<LineItemInput>,
        settings: &PricingSettings,
    ) -> Result<Vec<LineItem>, AppError> {
        let mut items = Vec::with_capacity(inputs.len());
        for input in inputs {
            let (name, unit_price) = match input.source {
                LineItemSource::Product { product_id } => {
                    let product = self
                        .repo
                        .get::<Product>(product_id)
                        .await?
                        .ok_or_else(|| AppError::validation("Line item product not found"))?
                        .data;
                    let price = match input.unit_price {
                        Some(price) => price,
                        None => {
                            let cost = product
                                .best_price()
                                .ok_or_else(|| {
                                    AppError::validation(format!("Product '{}' has no store price", product.name))
                                })?
                                .price;
                            settings.marked_up(cost)
                        }
                    };
                    (Some(product.name), price)
                }
                LineItemSource::Labor { labor_item_id, mode } => {
                    let labor = self
                        .repo
                        .get::<LaborItem>(labor_item_id)
                        .await?
                        .ok_or_else(|| AppError::validation("Line item labor item not found"))?
                        .data;
                    let price = match input.unit_price {
                        Some(price) => price,
                        // Hourly lines are priced per hour; the quantity is the hours.
                        None => match mode {
                            PricingMode::Flat => labor.pricing.price(PricingMode::Flat, None)?,
                            PricingMode::Hourly => match labor.pricing.hourly_rate {
                                Some(rate) => rate,
                                None if settings.default_hourly_rate > 0.0 => settings.default_hourly_rate,
                                None => labor.pricing.price(PricingMode::Hourly, Some(1.0))?,
                            },
                        },
                    };
                    (Some(labor.name), price)
                }
                LineItemSource::Custom => {
                    let price = input
                        .unit_price
                        .ok_or_else(|| AppError::validation("Custom line items need a unit price"))?;
                    (None, price)
                }
            };
            let description = input.description.or(name).unwrap_or_default();
            items.push(LineItem::new(input.source, &description, input.quantity, unit_price)?);
        }
        Ok(items)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, query: &EstimateQuery) -> Result<Vec<Record<Estimate>>, AppError> {
        let mut filter = self.repo.filter();
        if let Some(status) = query.status {
            filter = filter.eq("status", status.as_str());
        }
        if let Some(parent_id) = query.parent_id {
            filter = filter.eq("parent_estimate_id", parent_id.to_string());
        }
        let mut estimates = self.repo.find::<Estimate>(filter).await?;
        estimates.sort_by_key(|e| e.data.number);
        Ok(estimates)
    }

    pub async fn get(&self, id: Uuid) -> Result<Record<Estimate>, AppError> {
        self.repo.fetch(id).await
    }

    #[instrument(skip(self, req))]
    pub async fn create(&self, req: CreateEstimateRequest) -> Result<Record<Estimate>, AppError> {
        let status = match req.status.unwrap_or(EstimateStatus::Draft) {
            s @ (EstimateStatus::Draft | EstimateStatus::Estimate) => s,
            other => {
                return Err(AppError::validation(format!(
                    "New estimates cannot start as {}",
                    other.as_str()
                )))
            }
        };
        let mut customer = req.customer;
        self.check_customer(&mut customer).await?;
        self.check_project(req.project_id).await?;
        check_attachments(&req.pictures)?;
        check_attachments(&req.documents)?;

        let settings = self.settings().await?;
        let tax_rate = req.tax_rate.unwrap_or(settings.default_tax_rate);
        let discount = req.discount.unwrap_or(0.0);
        check_rate(tax_rate, discount)?;

        let mut estimate = Estimate {
            number: self.next_number().await?,
            customer,
            line_items: self.build_line_items(req.line_items, &settings).await?,
            pictures: req.pictures,
            documents: req.documents,
            tax_rate,
            discount,
            totals: Totals::default(),
            status,
            parent_estimate_id: None,
            project_id: req.project_id,
            payment_schedule: None,
            notes: req.notes,
        };
        estimate.recompute_totals();

        let record = self.repo.insert(&estimate).await?;
        info!(id = %record.id, number = record.data.number, "estimate created");
        Ok(record)
    }

    #[instrument(skip(self, req))]
    pub async fn update(&self, id: Uuid, req: UpdateEstimateRequest) -> Result<Record<Estimate>, AppError> {
        let mut estimate = self.repo.fetch::<Estimate>(id).await?.data;
        if estimate.is_locked() {
            return Err(AppError::conflict("Invoices cannot be edited"));
        }

        if let Some(mut customer) = req.customer {
            self.check_customer(&mut customer).await?;
            estimate.customer = customer;
        }
        if req.project_id.is_some() {
            self.check_project(req.project_id).await?;
            estimate.project_id = req.project_id;
        }
        if let Some(inputs) = req.line_items {
            let settings = self.settings().await?;
            estimate.line_items = self.build_line_items(inputs, &settings).await?;
        }
        estimate.tax_rate = req.tax_rate.unwrap_or(estimate.tax_rate);
        estimate.discount = req.discount.unwrap_or(estimate.discount);
        check_rate(estimate.tax_rate, estimate.discount)?;
        estimate.notes = req.notes.or(estimate.notes);
        estimate.recompute_totals();

        if let Some(schedule) = &estimate.payment_schedule {
            schedule.validate(estimate.totals.total).map_err(|e| {
                warn!(%id, "update breaks the payment schedule");
                e
            })?;
        }

        self.repo.save(id, &estimate).await
    }

    #[instrument(skip(self))]
    pub async fn transition(&self, id: Uuid, next: EstimateStatus) -> Result<Record<Estimate>, AppError> {
        let mut estimate = self.repo.fetch::<Estimate>(id).await?.data;
        if !estimate.status.can_transition_to(next) {
            return Err(AppError::conflict(format!(
                "Cannot move from {} to {}",
                estimate.status.as_str(),
                next.as_str()
            )));
        }
        estimate.status = next;
        let record = self.repo.save(id, &estimate).await?;
        info!(%id, status = next.as_str(), "estimate status changed");
        Ok(record)
    }

    #[instrument(skip(self, req))]
    pub async fn create_change_order(
        &self,
        parent_id: Uuid,
        req: ChangeOrderRequest,
    ) -> Result<Record<Estimate>, AppError> {
        let parent = self.repo.fetch::<Estimate>(parent_id).await?.data;
        if parent.parent_estimate_id.is_some() {
            return Err(AppError::conflict("Change orders cannot be nested"));
        }
        if !matches!(parent.status, EstimateStatus::Estimate | EstimateStatus::Invoice) {
            return Err(AppError::conflict(
                "Change orders can only be raised against estimates or invoices",
            ));
        }

        let settings = self.settings().await?;
        let tax_rate = req.tax_rate.unwrap_or(parent.tax_rate);
        let discount = req.discount.unwrap_or(0.0);
        check_rate(tax_rate, discount)?;

        let mut change_order = Estimate {
            number: self.next_number().await?,
            customer: parent.customer,
            line_items: self.build_line_items(req.line_items, &settings).await?,
            pictures: Vec::new(),
            documents: Vec::new(),
            tax_rate,
            discount,
            totals: Totals::default(),
            status: EstimateStatus::ChangeOrder,
            parent_estimate_id: Some(parent_id),
            project_id: parent.project_id,
            payment_schedule: None,
            notes: req.notes,
        };
        change_order.recompute_totals();

        let record = self.repo.insert(&change_order).await?;
        info!(id = %record.id, %parent_id, "change order created");
        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let has_change_orders = self
            .repo
            .exists::<Estimate>(self.repo.filter().eq("parent_estimate_id", json!(id)))
            .await?;
        if has_change_orders {
            return Err(AppError::conflict("Delete the change orders of this estimate first"));
        }
        self.repo.delete::<Estimate>(id).await
    }

    /// Appends uploaded files to an existing estimate.
    #[instrument(skip(self, req))]
    pub async fn add_attachments(&self, id: Uuid, req: AttachmentsRequest) -> Result<Record<Estimate>, AppError> {
        check_attachments(&req.pictures)?;
        check_attachments(&req.documents)?;
        let mut estimate = self.repo.fetch::<Estimate>(id).await?.data;
        estimate.pictures.extend(req.pictures);
        estimate.documents.extend(req.documents);
        self.repo.save(id, &estimate).await
    }

    #[instrument(skip(self, schedule))]
    pub async fn set_payment_schedule(
        &self,
        id: Uuid,
        schedule: PaymentSchedule,
    ) -> Result<Record<Estimate>, AppError> {
        let mut estimate = self.repo.fetch::<Estimate>(id).await?.data;
        if estimate.is_locked() {
            return Err(AppError::conflict("Invoices cannot be edited"));
        }
        schedule.validate(estimate.totals.total)?;
        estimate.payment_schedule = Some(schedule);
        self.repo.save(id, &estimate).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::labor::LaborPricing;
    use crate::models::payment_schedule::{PaymentEntry, ScheduleMode};
    use crate::models::product::{Stock, StorePrice};
    use crate::models::category::CategorySelection;
    use crate::store::MemoryDocumentStore;

    fn customer() -> CustomerInfo {
        CustomerInfo { name: "Pat Homeowner".into(), ..Default::default() }
    }

    fn custom_line(quantity: f64, price: f64) -> LineItemInput {
        LineItemInput {
            source: LineItemSource::Custom,
            description: Some("Dumpster rental".into()),
            quantity,
            unit_price: Some(price),
        }
    }

    fn create_req(lines: Vec<LineItemInput>) -> CreateEstimateRequest {
        CreateEstimateRequest {
            customer: customer(),
            line_items: lines,
            tax_rate: None,
            discount: None,
            status: None,
            project_id: None,
            notes: None,
            pictures: Vec::new(),
            documents: Vec::new(),
        }
    }

    #[tokio::test]
    async fn numbers_increase_per_user() {
        let store = MemoryDocumentStore::new();
        let alice = EstimateService::new(UserRepo::new(&store, Uuid::now_v7()));
        let bob = EstimateService::new(UserRepo::new(&store, Uuid::now_v7()));

        assert_eq!(alice.create(create_req(vec![])).await.unwrap().data.number, 1);
        assert_eq!(alice.create(create_req(vec![])).await.unwrap().data.number, 2);
        assert_eq!(bob.create(create_req(vec![])).await.unwrap().data.number, 1);
    }

    #[tokio::test]
    async fn prices_come_from_products_labor_and_settings() {
        let store = MemoryDocumentStore::new();
        let repo = UserRepo::new(&store, Uuid::now_v7());
        PricingService::new(repo)
            .update(crate::dtos::pricing::UpdatePricingRequest {
                default_tax_rate: Some(10.0),
                default_markup_percent: Some(20.0),
                ..Default::default()
            })
            .await
            .unwrap();

        let product = repo
            .insert(&Product {
                name: "Toilet".into(),
                description: None,
                brand_id: None,
                unit: "ea".into(),
                classification: CategorySelection::default(),
                store_prices: vec![
                    StorePrice { store_id: Uuid::now_v7(), sku: "T1".into(), price: 250.0, url: None },
                    StorePrice { store_id: Uuid::now_v7(), sku: "T2".into(), price: 200.0, url: None },
                ],
                stock: Stock::default(),
                image_url: None,
            })
            .await
            .unwrap();
        let labor = repo
            .insert(&LaborItem {
                name: "Install toilet".into(),
                description: None,
                classification: CategorySelection::default(),
                pricing: LaborPricing { flat_rate: Some(175.0), hourly_rate: Some(90.0), estimated_hours: None },
                tasks: Vec::new(),
            })
            .await
            .unwrap();

        let svc = EstimateService::new(repo);
        let estimate = svc
            .create(create_req(vec![
                LineItemInput {
                    source: LineItemSource::Product { product_id: product.id },
                    description: None,
                    quantity: 2.0,
                    unit_price: None,
                },
                LineItemInput {
                    source: LineItemSource::Labor { labor_item_id: labor.id, mode: PricingMode::Flat },
                    description: None,
                    quantity: 2.0,
                    unit_price: None,
                },
                LineItemInput {
                    source: LineItemSource::Labor { labor_item_id: labor.id, mode: PricingMode::Hourly },
                    description: Some("Haul away old fixtures".into()),
                    quantity: 1.5,
                    unit_price: None,
                },
            ]))
            .await
            .unwrap()
            .data;

        assert_eq!(estimate.line_items[0].description, "Toilet");
        assert_eq!(estimate.line_items[0].unit_price, 240.0);
        assert_eq!(estimate.line_items[0].total, 480.0);
        assert_eq!(estimate.line_items[1].total, 350.0);
        assert_eq!(estimate.line_items[2].description, "Haul away old fixtures");
        assert_eq!(estimate.line_items[2].total, 135.0);
        assert_eq!(estimate.tax_rate, 10.0);
        assert_eq!(estimate.totals.subtotal, 965.0);
        assert_eq!(estimate.totals.tax, 96.5);
        assert_eq!(estimate.totals.total, 1061.5);
    }

    #[tokio::test]
    async fn lifecycle_and_locking() {
        let store = MemoryDocumentStore::new();
        let svc = EstimateService::new(UserRepo::new(&store, Uuid::now_v7()));
        let estimate = svc.create(create_req(vec![custom_line(1.0, 500.0)])).await.unwrap();

        // Drafts cannot have change orders.
        let early = svc
            .create_change_order(estimate.id, ChangeOrderRequest { line_items: vec![], tax_rate: None, discount: None, notes: None })
            .await;
        assert!(matches!(early, Err(AppError::Conflict(_))));

        svc.transition(estimate.id, EstimateStatus::Estimate).await.unwrap();
        let change = svc
            .create_change_order(
                estimate.id,
                ChangeOrderRequest { line_items: vec![custom_line(1.0, 80.0)], tax_rate: None, discount: None, notes: None },
            )
            .await
            .unwrap();
        assert_eq!(change.data.status, EstimateStatus::ChangeOrder);
        assert_eq!(change.data.parent_estimate_id, Some(estimate.id));
        assert_eq!(change.data.customer.name, "Pat Homeowner");
        assert_eq!(change.data.number, 2);

        let children = svc
            .list(&EstimateQuery { parent_id: Some(estimate.id), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(children.len(), 1);

        // Change orders cannot have change orders of their own.
        let nested = svc
            .create_change_order(change.id, ChangeOrderRequest { line_items: vec![], tax_rate: None, discount: None, notes: None })
            .await;
        assert!(matches!(nested, Err(AppError::Conflict(_))));

        // Still true once the change order is invoiced.
        svc.transition(change.id, EstimateStatus::Invoice).await.unwrap();
        let nested = svc
            .create_change_order(
                change.id,
                ChangeOrderRequest { line_items: vec![custom_line(1.0, 10.0)], tax_rate: None, discount: None, notes: None },
            )
            .await;
        assert!(matches!(nested, Err(AppError::Conflict(_))));
        let grandchildren = svc
            .list(&EstimateQuery { parent_id: Some(change.id), ..Default::default() })
            .await
            .unwrap();
        assert!(grandchildren.is_empty());

        assert!(matches!(svc.delete(estimate.id).await, Err(AppError::Conflict(_))));

        svc.transition(estimate.id, EstimateStatus::Invoice).await.unwrap();
        let edit = svc.update(estimate.id, UpdateEstimateRequest { notes: Some("late".into()), ..Default::default() }).await;
        assert!(matches!(edit, Err(AppError::Conflict(_))));
        let back = svc.transition(estimate.id, EstimateStatus::Draft).await;
        assert!(matches!(back, Err(AppError::Conflict(_))));

        svc.delete(change.id).await.unwrap();
        svc.delete(estimate.id).await.unwrap();
    }

    #[tokio::test]
    async fn payment_schedule_follows_the_total() {
        let store = MemoryDocumentStore::new();
        let svc = EstimateService::new(UserRepo::new(&store, Uuid::now_v7()));
        let estimate = svc.create(create_req(vec![custom_line(1.0, 1000.0)])).await.unwrap();

        let by_amount = PaymentSchedule {
            mode: ScheduleMode::Amount,
            entries: vec![
                PaymentEntry { label: "Deposit".into(), value: 300.0, due_date: None },
                PaymentEntry { label: "Completion".into(), value: 600.0, due_date: None },
            ],
        };
        assert!(matches!(
            svc.set_payment_schedule(estimate.id, by_amount.clone()).await,
            Err(AppError::Validation(_))
        ));

        let mut fixed = by_amount;
        fixed.entries[1].value = 700.0;
        svc.set_payment_schedule(estimate.id, fixed).await.unwrap();

        // Changing the lines would make the amounts stop adding up.
        let update = svc
            .update(
                estimate.id,
                UpdateEstimateRequest { line_items: Some(vec![custom_line(1.0, 1200.0)]), ..Default::default() },
            )
            .await;
        assert!(matches!(update, Err(AppError::Validation(_))));
        assert_eq!(svc.get(estimate.id).await.unwrap().data.totals.total, 1000.0);
    }

    #[tokio::test]
    async fn attachments_are_patched_in_later() {
        let store = MemoryDocumentStore::new();
        let svc = EstimateService::new(UserRepo::new(&store, Uuid::now_v7()));
        let estimate = svc.create(create_req(vec![])).await.unwrap();

        let patched = svc
            .add_attachments(
                estimate.id,
                AttachmentsRequest {
                    pictures: vec![Attachment { name: "before.jpg".into(), url: "https://files/before.jpg".into(), content_type: None }],
                    documents: vec![],
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.data.pictures.len(), 1);

        let blank = svc
            .add_attachments(
                estimate.id,
                AttachmentsRequest {
                    pictures: vec![Attachment { name: "x".into(), url: " ".into(), content_type: None }],
                    documents: vec![],
                },
            )
            .await;
        assert!(matches!(blank, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn invalid_inputs() {
        let store = MemoryDocumentStore::new();
        let svc = EstimateService::new(UserRepo::new(&store, Uuid::now_v7()));

        let mut invoice_first = create_req(vec![]);
        invoice_first.status = Some(EstimateStatus::Invoice);
        assert!(matches!(svc.create(invoice_first).await, Err(AppError::Validation(_))));

        let no_price = LineItemInput { source: LineItemSource::Custom, description: Some("x".into()), quantity: 1.0, unit_price: None };
        assert!(matches!(svc.create(create_req(vec![no_price])).await, Err(AppError::Validation(_))));

        let missing_product = LineItemInput {
            source: LineItemSource::Product { product_id: Uuid::now_v7() },
            description: None,
            quantity: 1.0,
            unit_price: None,
        };
        assert!(matches!(svc.create(create_req(vec![missing_product])).await, Err(AppError::Validation(_))));

        let mut nameless = create_req(vec![]);
        nameless.customer.name = " ".into();
        assert!(matches!(svc.create(nameless).await, Err(AppError::Validation(_))));
    }
}
