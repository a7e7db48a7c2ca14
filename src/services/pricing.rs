use tracing::instrument;

use crate::dtos::pricing::UpdatePricingRequest;
use crate::error::AppError;
use crate::models::pricing::PricingSettings;
use crate::services::{Record, UserRepo};

/// One settings document per user; absent means all defaults.
pub struct PricingService<'a> {
    repo: UserRepo<'a>,
}

impl<'a> PricingService<'a> {
    pub fn new(repo: UserRepo<'a>) -> Self {
        Self { repo }
    }

    async fn stored(&self) -> Result<Option<Record<PricingSettings>>, AppError> {
        Ok(self.repo.list::<PricingSettings>().await?.into_iter().next())
    }

    pub async fn get(&self) -> Result<PricingSettings, AppError> {
        Ok(self.stored().await?.map(|r| r.data).unwrap_or_default())
    }

    #[instrument(skip(self, req))]
    pub async fn update(&self, req: UpdatePricingRequest) -> Result<PricingSettings, AppError> {
        let stored = self.stored().await?;
        let current = stored.as_ref().map(|r| r.data).unwrap_or_default();
        let settings = PricingSettings {
            default_tax_rate: req.default_tax_rate.unwrap_or(current.default_tax_rate),
            default_markup_percent: req.default_markup_percent.unwrap_or(current.default_markup_percent),
            default_hourly_rate: req.default_hourly_rate.unwrap_or(current.default_hourly_rate),
        };
        settings.validate()?;

        let saved = match stored {
            Some(record) => self.repo.save(record.id, &settings).await?,
            None => self.repo.insert(&settings).await?,
        };
        Ok(saved.data)
    }
}
