//! Imports products scraped by the browser extension.

use tracing::{info, instrument};

use crate::dtos::extension::ImportProductRequest;
use crate::dtos::product::{CreateProductRequest, UpsertStorePriceRequest};
use crate::error::AppError;
use crate::models::product::{Product, StorePrice};
use crate::models::supplier::{Brand, Store};
use crate::services::category_cache::CategoryCache;
use crate::services::products::ProductService;
use crate::services::suppliers::SupplierService;
use crate::services::{required_name, Record, UserRepo};

/// Pulls the first amount out of price text such as `"$1,299.99 /each"`.
/// Thousands separators are dropped; a bare leading point (`"$.99"`) is kept.
pub fn parse_price_text(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let start = bytes.iter().enumerate().position(|(i, b)| {
        b.is_ascii_digit() || (*b == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    })?;
    let amount: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .filter(|c| *c != ',')
        .collect();
    amount
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
}

pub struct ExtensionService<'a> {
    products: ProductService<'a>,
    suppliers: SupplierService<'a>,
}

impl<'a> ExtensionService<'a> {
    pub fn new(repo: UserRepo<'a>, cache: &'a CategoryCache) -> Self {
        Self { products: ProductService::new(repo, cache), suppliers: SupplierService::new(repo) }
    }

    /// Upserts the scraped store price onto a matching product, or creates
    /// the product. The flag tells whether a product was created.
    #[instrument(skip(self, req))]
    pub async fn import(&self, req: ImportProductRequest) -> Result<(Record<Product>, bool), AppError> {
        let data = req
            .response
            .product_data
            .ok_or_else(|| AppError::validation("Extension response has no product data"))?;
        let name = required_name(&data.name, "Product name")?;
        let price = data
            .price
            .or_else(|| data.price_text.as_deref().and_then(parse_price_text))
            .ok_or_else(|| AppError::validation("Could not read a price from the page"))?;
        let sku = data
            .sku
            .or_else(|| data.url.clone())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::validation("Scraped product has neither a SKU nor a URL"))?;

        let (store, new_store) = self
            .suppliers
            .find_or_create::<Store>(&required_name(&data.store_name, "Store name")?)
            .await?;
        let brand_id = match data.brand.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
            Some(brand) => Some(self.suppliers.find_or_create::<Brand>(brand).await?.0.id),
            None => None,
        };

        let existing = match self.products.find_by_sku(store.id, &sku).await? {
            Some(found) => Some(found),
            None => self.products.find_by_name(&name).await?,
        };

        if let Some(product) = existing {
            let record = self
                .products
                .upsert_store_price(product.id, store.id, UpsertStorePriceRequest { sku, price, url: data.url })
                .await?;
            info!(id = %record.id, store = %store.data.name, price, "imported price onto existing product");
            return Ok((record, false));
        }

        let record = self
            .products
            .create(CreateProductRequest {
                name,
                description: data.description,
                brand_id,
                unit: req.unit,
                classification: req.classification,
                store_prices: vec![StorePrice { store_id: store.id, sku, price, url: data.url }],
                stock: None,
                image_url: data.image_url,
            })
            .await?;
        info!(id = %record.id, store = %store.data.name, new_store, "imported new product");
        Ok((record, true))
    }
}
