//! Wire types shared with the supplier-scraping browser extension.
//!
//! The popup sends `{"action": "getProductData"}` to the content script and
//! gets `{"productData": {...}}` back; it then forwards that response to
//! `POST /extension/import`.

use serde::{Deserialize, Serialize};

use crate::dtos::product::ProductResponse;
use crate::models::category::CategorySelection;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ExtensionRequest {
    GetProductData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedProduct {
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    /// Raw price text from the page, used when `price` is missing.
    #[serde(default)]
    pub price_text: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    pub store_name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionResponse {
    pub product_data: Option<ScrapedProduct>,
}

#[derive(Debug, Deserialize)]
pub struct ImportProductRequest {
    #[serde(flatten)]
    pub response: ExtensionResponse,
    #[serde(default)]
    pub classification: CategorySelection,
    pub unit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportProductResponse {
    pub product: ProductResponse,
    pub created: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_action_tag() {
        let wire = serde_json::to_value(ExtensionRequest::GetProductData).unwrap();
        assert_eq!(wire, json!({"action": "getProductData"}));
        let parsed: ExtensionRequest = serde_json::from_value(json!({"action": "getProductData"})).unwrap();
        assert_eq!(parsed, ExtensionRequest::GetProductData);
        assert!(serde_json::from_value::<ExtensionRequest>(json!({"action": "scrapeAll"})).is_err());
    }

    #[test]
    fn response_is_camel_case() {
        let parsed: ExtensionResponse = serde_json::from_value(json!({
            "productData": {
                "name": "PEX Crimp Ring",
                "priceText": "$12.98",
                "storeName": "Home Depot",
                "imageUrl": "https://example.com/ring.jpg"
            }
        }))
        .unwrap();
        let data = parsed.product_data.unwrap();
        assert_eq!(data.price_text.as_deref(), Some("$12.98"));
        assert_eq!(data.store_name, "Home Depot");
        assert!(data.price.is_none());
    }

    #[test]
    fn import_request_wraps_the_extension_response() {
        let parsed: ImportProductRequest = serde_json::from_value(json!({
            "productData": {"name": "Wire nut", "price": 0.25, "storeName": "Lowe's"},
            "unit": "ea"
        }))
        .unwrap();
        assert_eq!(parsed.unit.as_deref(), Some("ea"));
        assert!(parsed.classification.is_empty());
        assert_eq!(parsed.response.product_data.unwrap().price, Some(0.25));
    }
}
