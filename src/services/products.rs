use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dtos::product::{
    AdjustStockRequest, CreateProductRequest, ProductQuery, UpdateProductRequest, UpsertStorePriceRequest,
};
use crate::error::AppError;
use crate::models::category::{CategoryKind, CategorySelection};
use crate::models::product::{Product, Stock, StorePrice};
use crate::models::supplier::{Brand, Store};
use crate::services::categories::CategoryService;
use crate::services::category_cache::CategoryCache;
use crate::services::{non_negative, required_name, Record, UserRepo};

pub const DEFAULT_UNIT: &str = "ea";

/// Containment pattern matching every selected level of `selection`.
pub fn classification_pattern(selection: &CategorySelection) -> Map<String, Value> {
    selection
        .iter()
        .map(|(level, id)| (level.as_str().to_string(), Value::String(id.to_string())))
        .collect()
}

pub struct ProductService<'a> {
    repo: UserRepo<'a>,
    categories: CategoryService<'a>,
}

impl<'a> ProductService<'a> {
    pub fn new(repo: UserRepo<'a>, cache: &'a CategoryCache) -> Self {
        Self { repo, categories: CategoryService::new(repo, cache) }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, query: &ProductQuery) -> Result<Vec<Record<Product>>, AppError> {
        let mut filter = self.repo.filter();
        let pattern = classification_pattern(&query.classification());
        if !pattern.is_empty() {
            filter = filter.eq("classification", pattern);
        }
        let needle = query.search.as_deref().map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());

        let mut products: Vec<Record<Product>> = self
            .repo
            .find::<Product>(filter)
            .await?
            .into_iter()
            .filter(|p| needle.as_ref().map_or(true, |n| p.data.name.to_lowercase().contains(n)))
            .collect();
        products.sort_by_key(|p| p.data.name.to_lowercase());
        Ok(products)
    }

    pub async fn get(&self, id: Uuid) -> Result<Record<Product>, AppError> {
        self.repo.fetch(id).await
    }

    /// Finds a product listed at `store_id` under `sku`.
    pub async fn find_by_sku(&self, store_id: Uuid, sku: &str) -> Result<Option<Record<Product>>, AppError> {
        let filter = self
            .repo
            .filter()
            .eq("store_prices", serde_json::json!([{ "store_id": store_id, "sku": sku }]));
        Ok(self.repo.find::<Product>(filter).await?.into_iter().next())
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Record<Product>>, AppError> {
        let wanted = name.trim().to_lowercase();
        Ok(self
            .repo
            .list::<Product>()
            .await?
            .into_iter()
            .find(|p| p.data.name.to_lowercase() == wanted))
    }

    async fn check_brand(&self, brand_id: Option<Uuid>) -> Result<(), AppError> {
        if let Some(id) = brand_id {
            if self.repo.get::<Brand>(id).await?.is_none() {
                return Err(AppError::validation("Brand not found"));
            }
        }
        Ok(())
    }

    async fn check_store_price(&self, price: StorePrice) -> Result<StorePrice, AppError> {
        if self.repo.get::<Store>(price.store_id).await?.is_none() {
            return Err(AppError::validation("Store not found"));
        }
        Ok(StorePrice {
            store_id: price.store_id,
            sku: required_name(&price.sku, "SKU")?,
            price: non_negative(price.price, "Price")?,
            url: price.url,
        })
    }

    async fn check_store_prices(&self, prices: Vec<StorePrice>) -> Result<Vec<StorePrice>, AppError> {
        let mut seen = HashSet::new();
        let mut checked = Vec::with_capacity(prices.len());
        for price in prices {
            if !seen.insert(price.store_id) {
                return Err(AppError::validation("Only one price per store is allowed"));
            }
            checked.push(self.check_store_price(price).await?);
        }
        Ok(checked)
    }

    fn unit(raw: Option<String>) -> Result<String, AppError> {
        match raw {
            Some(unit) => required_name(&unit, "Unit"),
            None => Ok(DEFAULT_UNIT.to_string()),
        }
    }

    #[instrument(skip(self, req))]
    pub async fn create(&self, req: CreateProductRequest) -> Result<Record<Product>, AppError> {
        let name = required_name(&req.name, "Product name")?;
        self.categories
            .validate_selection(CategoryKind::Product, &req.classification)
            .await?;
        self.check_brand(req.brand_id).await?;
        let stock = req.stock.unwrap_or_default();

        let product = Product {
            name,
            description: req.description,
            brand_id: req.brand_id,
            unit: Self::unit(req.unit)?,
            classification: req.classification,
            store_prices: self.check_store_prices(req.store_prices).await?,
            stock: Stock::new(stock.on_hand, stock.assigned)?,
            image_url: req.image_url,
        };
        let record = self.repo.insert(&product).await?;
        info!(id = %record.id, "product created");
        Ok(record)
    }

    #[instrument(skip(self, req))]
    pub async fn update(&self, id: Uuid, req: UpdateProductRequest) -> Result<Record<Product>, AppError> {
        let mut product = self.repo.fetch::<Product>(id).await?.data;

        if let Some(name) = req.name {
            product.name = required_name(&name, "Product name")?;
        }
        if let Some(level) = req.clear_classification_from {
            product.classification.clear(level);
        }
        if let Some(patch) = req.classification {
            product.classification.apply(&patch);
        }
        self.categories
            .validate_selection(CategoryKind::Product, &product.classification)
            .await?;
        if req.brand_id.is_some() {
            self.check_brand(req.brand_id).await?;
            product.brand_id = req.brand_id;
        }
        if req.unit.is_some() {
            product.unit = Self::unit(req.unit)?;
        }
        if let Some(stock) = req.stock {
            product.stock = Stock::new(stock.on_hand, stock.assigned)?;
        }
        product.description = req.description.or(product.description);
        product.image_url = req.image_url.or(product.image_url);

        self.repo.save(id, &product).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete::<Product>(id).await?;
        info!(%id, "product deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn adjust_stock(&self, id: Uuid, req: &AdjustStockRequest) -> Result<Record<Product>, AppError> {
        let mut product = self.repo.fetch::<Product>(id).await?.data;
        product.stock = product.stock.adjust(req.on_hand_delta, req.assigned_delta)?;
        self.repo.save(id, &product).await
    }

    #[instrument(skip(self, req))]
    pub async fn upsert_store_price(
        &self,
        id: Uuid,
        store_id: Uuid,
        req: UpsertStorePriceRequest,
    ) -> Result<Record<Product>, AppError> {
        let mut product = self.repo.fetch::<Product>(id).await?.data;
        let price = self
            .check_store_price(StorePrice { store_id, sku: req.sku, price: req.price, url: req.url })
            .await?;
        product.upsert_store_price(price);
        self.repo.save(id, &product).await
    }

    pub async fn remove_store_price(&self, id: Uuid, store_id: Uuid) -> Result<Record<Product>, AppError> {
        let mut product = self.repo.fetch::<Product>(id).await?.data;
        if !product.remove_store_price(store_id) {
            return Err(AppError::not_found("Product has no price at this store"));
        }
        self.repo.save(id, &product).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::product::StockInput;
    use crate::models::category::CategoryLevel;
    use crate::store::MemoryDocumentStore;

    struct Fixture {
        store: MemoryDocumentStore,
        cache: CategoryCache,
        user: Uuid,
    }

    impl Fixture {
        fn new() -> Self {
            Self { store: MemoryDocumentStore::new(), cache: CategoryCache::new(), user: Uuid::now_v7() }
        }

        fn repo(&self) -> UserRepo<'_> {
            UserRepo::new(&self.store, self.user)
        }

        fn products(&self) -> ProductService<'_> {
            ProductService::new(self.repo(), &self.cache)
        }

        fn categories(&self) -> CategoryService<'_> {
            CategoryService::new(self.repo(), &self.cache)
        }
    }

    fn create(name: &str) -> CreateProductRequest {
        CreateProductRequest {
            name: name.into(),
            description: None,
            brand_id: None,
            unit: None,
            classification: CategorySelection::default(),
            store_prices: Vec::new(),
            stock: None,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_and_validation() {
        let fx = Fixture::new();
        let svc = fx.products();

        let product = svc.create(create("  Copper pipe ")).await.unwrap();
        assert_eq!(product.data.name, "Copper pipe");
        assert_eq!(product.data.unit, DEFAULT_UNIT);
        assert_eq!(product.data.stock, Stock::default());

        let mut bad_stock = create("Pipe");
        bad_stock.stock = Some(StockInput { on_hand: 1.0, assigned: 2.0 });
        assert!(matches!(svc.create(bad_stock).await, Err(AppError::Validation(_))));

        let mut unknown_brand = create("Pipe");
        unknown_brand.brand_id = Some(Uuid::now_v7());
        assert!(matches!(svc.create(unknown_brand).await, Err(AppError::Validation(_))));

        let mut unknown_store = create("Pipe");
        unknown_store.store_prices =
            vec![StorePrice { store_id: Uuid::now_v7(), sku: "1".into(), price: 1.0, url: None }];
        assert!(matches!(svc.create(unknown_store).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn list_filters_by_classification_and_search() {
        let fx = Fixture::new();
        let cats = fx.categories();
        let plumbing = cats.add_option(CategoryKind::Product, CategoryLevel::Trade, None, "Plumbing").await.unwrap();
        let electrical = cats.add_option(CategoryKind::Product, CategoryLevel::Trade, None, "Electrical").await.unwrap();
        let pipe = cats
            .add_option(CategoryKind::Product, CategoryLevel::Section, Some(plumbing.id), "Pipe")
            .await
            .unwrap();

        let svc = fx.products();
        let mut copper = create("Copper pipe");
        copper.classification = CategorySelection { trade: Some(plumbing.id), section: Some(pipe.id), ..Default::default() };
        svc.create(copper).await.unwrap();
        let mut pex = create("PEX pipe");
        pex.classification = CategorySelection { trade: Some(plumbing.id), ..Default::default() };
        svc.create(pex).await.unwrap();
        let mut wire = create("Romex wire");
        wire.classification = CategorySelection { trade: Some(electrical.id), ..Default::default() };
        svc.create(wire).await.unwrap();

        let by_trade = svc.list(&ProductQuery { trade: Some(plumbing.id), ..Default::default() }).await.unwrap();
        assert_eq!(by_trade.len(), 2);
        let by_section = svc.list(&ProductQuery { section: Some(pipe.id), ..Default::default() }).await.unwrap();
        assert_eq!(by_section.len(), 1);
        let search = svc.list(&ProductQuery { search: Some("PIPE".into()), ..Default::default() }).await.unwrap();
        let names: Vec<&str> = search.iter().map(|p| p.data.name.as_str()).collect();
        assert_eq!(names, vec!["Copper pipe", "PEX pipe"]);
    }

    #[tokio::test]
    async fn changing_trade_drops_lower_levels() {
        let fx = Fixture::new();
        let cats = fx.categories();
        let plumbing = cats.add_option(CategoryKind::Product, CategoryLevel::Trade, None, "Plumbing").await.unwrap();
        let electrical = cats.add_option(CategoryKind::Product, CategoryLevel::Trade, None, "Electrical").await.unwrap();
        let pipe = cats
            .add_option(CategoryKind::Product, CategoryLevel::Section, Some(plumbing.id), "Pipe")
            .await
            .unwrap();

        let svc = fx.products();
        let mut req = create("Fitting");
        req.classification = CategorySelection { trade: Some(plumbing.id), section: Some(pipe.id), ..Default::default() };
        let product = svc.create(req).await.unwrap();

        let updated = svc
            .update(
                product.id,
                UpdateProductRequest {
                    classification: Some(CategorySelection { trade: Some(electrical.id), ..Default::default() }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.data.classification.trade, Some(electrical.id));
        assert_eq!(updated.data.classification.section, None);

        let cleared = svc
            .update(
                product.id,
                UpdateProductRequest { clear_classification_from: Some(CategoryLevel::Trade), ..Default::default() },
            )
            .await
            .unwrap();
        assert!(cleared.data.classification.is_empty());
    }

    #[tokio::test]
    async fn stock_adjustments_keep_available_derived() {
        let fx = Fixture::new();
        let svc = fx.products();
        let mut req = create("Shingles");
        req.stock = Some(StockInput { on_hand: 40.0, assigned: 0.0 });
        let product = svc.create(req).await.unwrap();

        let adjusted = svc
            .adjust_stock(product.id, &AdjustStockRequest { on_hand_delta: 10.0, assigned_delta: 15.0 })
            .await
            .unwrap();
        assert_eq!(adjusted.data.stock.available(), 35.0);

        let over = svc
            .adjust_stock(product.id, &AdjustStockRequest { on_hand_delta: 0.0, assigned_delta: 40.0 })
            .await;
        assert!(matches!(over, Err(AppError::Validation(_))));
        assert_eq!(svc.get(product.id).await.unwrap().data.stock.assigned, 15.0);
    }

    #[tokio::test]
    async fn store_prices_and_sku_lookup() {
        let fx = Fixture::new();
        let store = fx.repo().insert(&Store { name: "Depot".into(), website: None }).await.unwrap();
        let svc = fx.products();
        let product = svc.create(create("Drywall screw")).await.unwrap();

        svc.upsert_store_price(product.id, store.id, UpsertStorePriceRequest { sku: "DW-1".into(), price: 8.97, url: None })
            .await
            .unwrap();
        let found = svc.find_by_sku(store.id, "DW-1").await.unwrap().unwrap();
        assert_eq!(found.id, product.id);
        assert!(svc.find_by_sku(store.id, "DW-2").await.unwrap().is_none());

        let negative = svc
            .upsert_store_price(product.id, store.id, UpsertStorePriceRequest { sku: "DW-1".into(), price: -1.0, url: None })
            .await;
        assert!(matches!(negative, Err(AppError::Validation(_))));

        svc.remove_store_price(product.id, store.id).await.unwrap();
        assert!(matches!(svc.remove_store_price(product.id, store.id).await, Err(AppError::NotFound(_))));
    }
}
