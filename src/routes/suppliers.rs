use axum::{routing::get, Router};

use crate::handlers::supplier::{create_named, delete_brand, delete_store, get_named, list_named, update_named};
use crate::models::supplier::{Brand, Store};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stores", get(list_named::<Store>).post(create_named::<Store>))
        .route(
            "/stores/{id}",
            get(get_named::<Store>).put(update_named::<Store>).delete(delete_store),
        )
        .route("/brands", get(list_named::<Brand>).post(create_named::<Brand>))
        .route(
            "/brands/{id}",
            get(get_named::<Brand>).put(update_named::<Brand>).delete(delete_brand),
        )
}
