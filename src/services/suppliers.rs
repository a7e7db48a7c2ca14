//! Stores and brands: small lookup records with per-user unique names.

use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dtos::supplier::{CreateNamedRequest, UpdateNamedRequest};
use crate::error::AppError;
use crate::models::product::Product;
use crate::models::supplier::{Brand, NamedRecord, Store};
use crate::services::{required_name, Record, UserRepo};

pub struct SupplierService<'a> {
    repo: UserRepo<'a>,
}

impl<'a> SupplierService<'a> {
    pub fn new(repo: UserRepo<'a>) -> Self {
        Self { repo }
    }

    pub async fn list<T: NamedRecord>(&self) -> Result<Vec<Record<T>>, AppError> {
        let mut records = self.repo.list::<T>().await?;
        records.sort_by_key(|r| r.data.name().to_lowercase());
        Ok(records)
    }

    pub async fn get<T: NamedRecord>(&self, id: Uuid) -> Result<Record<T>, AppError> {
        self.repo.fetch::<T>(id).await
    }

    pub async fn find_by_name<T: NamedRecord>(&self, name: &str) -> Result<Option<Record<T>>, AppError> {
        let wanted = name.trim().to_lowercase();
        Ok(self
            .repo
            .list::<T>()
            .await?
            .into_iter()
            .find(|r| r.data.name().to_lowercase() == wanted))
    }

    async fn ensure_unique<T: NamedRecord>(&self, name: &str, except: Option<Uuid>) -> Result<(), AppError> {
        if let Some(existing) = self.find_by_name::<T>(name).await? {
            if Some(existing.id) != except {
                return Err(AppError::conflict(format!("{} name already exists", T::LABEL)));
            }
        }
        Ok(())
    }

    #[instrument(skip(self, req))]
    pub async fn create<T: NamedRecord>(&self, req: CreateNamedRequest) -> Result<Record<T>, AppError> {
        let name = required_name(&req.name, "Name")?;
        self.ensure_unique::<T>(&name, None).await?;
        let record = self.repo.insert(&T::with_name(name, req.website)).await?;
        info!(id = %record.id, label = T::LABEL, "created");
        Ok(record)
    }

    /// Returns the record named `name`, creating it when missing. The flag
    /// tells whether it was created.
    pub async fn find_or_create<T: NamedRecord>(&self, name: &str) -> Result<(Record<T>, bool), AppError> {
        match self.find_by_name::<T>(name).await? {
            Some(record) => Ok((record, false)),
            None => {
                let record = self
                    .create::<T>(CreateNamedRequest { name: name.to_string(), website: None })
                    .await?;
                Ok((record, true))
            }
        }
    }

    #[instrument(skip(self, req))]
    pub async fn update<T: NamedRecord>(&self, id: Uuid, req: UpdateNamedRequest) -> Result<Record<T>, AppError> {
        let current = self.repo.fetch::<T>(id).await?;
        let name = match req.name {
            Some(name) => {
                let name = required_name(&name, "Name")?;
                self.ensure_unique::<T>(&name, Some(id)).await?;
                name
            }
            None => current.data.name().to_string(),
        };
        let website = req.website.or_else(|| current.data.website().map(str::to_string));
        self.repo.save(id, &T::with_name(name, website)).await
    }

    #[instrument(skip(self))]
    pub async fn delete_store(&self, id: Uuid) -> Result<(), AppError> {
        let referenced = self
            .repo
            .exists::<Product>(self.repo.filter().eq("store_prices", json!([{ "store_id": id }])))
            .await?;
        if referenced {
            return Err(AppError::conflict("Cannot delete a store that products are priced at"));
        }
        self.repo.delete::<Store>(id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_brand(&self, id: Uuid) -> Result<(), AppError> {
        let referenced = self
            .repo
            .exists::<Product>(self.repo.filter().eq("brand_id", id.to_string()))
            .await?;
        if referenced {
            return Err(AppError::conflict("Cannot delete a brand used by products"));
        }
        self.repo.delete::<Brand>(id).await
    }
}
