use axum::{routing::{get, post, put}, Router};

use crate::handlers::product::{
    adjust_stock, create_product, delete_product, get_product, get_products, remove_store_price, update_product,
    upsert_store_price,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(get_products).post(create_product))
        .route("/products/{id}", get(get_product).put(update_product).delete(delete_product))
        .route("/products/{id}/stock", post(adjust_stock))
        .route("/products/{id}/prices/{store_id}", put(upsert_store_price).delete(remove_store_price))
}
