use axum::{routing::{delete, get, post}, Router};

use crate::handlers::category::{add_option, delete_option, list_options, resolve};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories/{kind}/resolve", post(resolve))
        .route("/categories/nodes/{id}", delete(delete_option))
        .route("/categories/{kind}/{level}", get(list_options).post(add_option))
}
