use axum::{routing::post, Router};

use crate::handlers::extension::import_product;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/extension/import", post(import_product))
}
