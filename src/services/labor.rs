use tracing::{info, instrument};
use uuid::Uuid;

use crate::dtos::labor::{CreateLaborItemRequest, LaborQuery, UpdateLaborItemRequest};
use crate::error::AppError;
use crate::models::category::CategoryKind;
use crate::models::labor::LaborItem;
use crate::services::categories::CategoryService;
use crate::services::category_cache::CategoryCache;
use crate::services::products::classification_pattern;
use crate::services::{required_name, Record, UserRepo};

pub struct LaborService<'a> {
    repo: UserRepo<'a>,
    categories: CategoryService<'a>,
}

impl<'a> LaborService<'a> {
    pub fn new(repo: UserRepo<'a>, cache: &'a CategoryCache) -> Self {
        Self { repo, categories: CategoryService::new(repo, cache) }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, query: &LaborQuery) -> Result<Vec<Record<LaborItem>>, AppError> {
        let mut filter = self.repo.filter();
        let pattern = classification_pattern(&query.classification());
        if !pattern.is_empty() {
            filter = filter.eq("classification", pattern);
        }
        let needle = query.search.as_deref().map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());

        let mut items: Vec<Record<LaborItem>> = self
            .repo
            .find::<LaborItem>(filter)
            .await?
            .into_iter()
            .filter(|i| needle.as_ref().map_or(true, |n| i.data.name.to_lowercase().contains(n)))
            .collect();
        items.sort_by_key(|i| i.data.name.to_lowercase());
        Ok(items)
    }

    pub async fn get(&self, id: Uuid) -> Result<Record<LaborItem>, AppError> {
        self.repo.fetch(id).await
    }

    #[instrument(skip(self, req))]
    pub async fn create(&self, req: CreateLaborItemRequest) -> Result<Record<LaborItem>, AppError> {
        let name = required_name(&req.name, "Labor item name")?;
        req.pricing.validate()?;
        self.categories
            .validate_selection(CategoryKind::Labor, &req.classification)
            .await?;

        let mut item = LaborItem {
            name,
            description: req.description,
            classification: req.classification,
            pricing: req.pricing,
            tasks: Vec::with_capacity(req.tasks.len()),
        };
        for task in &req.tasks {
            item.add_task(task)?;
        }

        let record = self.repo.insert(&item).await?;
        info!(id = %record.id, "labor item created");
        Ok(record)
    }

    #[instrument(skip(self, req))]
    pub async fn update(&self, id: Uuid, req: UpdateLaborItemRequest) -> Result<Record<LaborItem>, AppError> {
        let mut item = self.repo.fetch::<LaborItem>(id).await?.data;

        if let Some(name) = req.name {
            item.name = required_name(&name, "Labor item name")?;
        }
        if let Some(pricing) = req.pricing {
            pricing.validate()?;
            item.pricing = pricing;
        }
        if let Some(level) = req.clear_classification_from {
            item.classification.clear(level);
        }
        if let Some(patch) = req.classification {
            item.classification.apply(&patch);
        }
        self.categories
            .validate_selection(CategoryKind::Labor, &item.classification)
            .await?;
        item.description = req.description.or(item.description);

        self.repo.save(id, &item).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete::<LaborItem>(id).await
    }

    pub async fn add_task(&self, id: Uuid, description: &str) -> Result<Record<LaborItem>, AppError> {
        let mut item = self.repo.fetch::<LaborItem>(id).await?.data;
        item.add_task(description)?;
        self.repo.save(id, &item).await
    }

    pub async fn remove_task(&self, id: Uuid, task_id: Uuid) -> Result<Record<LaborItem>, AppError> {
        let mut item = self.repo.fetch::<LaborItem>(id).await?.data;
        item.remove_task(task_id)?;
        self.repo.save(id, &item).await
    }

    pub async fn reorder_tasks(&self, id: Uuid, order: &[Uuid]) -> Result<Record<LaborItem>, AppError> {
        let mut item = self.repo.fetch::<LaborItem>(id).await?.data;
        item.reorder_tasks(order)?;
        self.repo.save(id, &item).await
    }
}
