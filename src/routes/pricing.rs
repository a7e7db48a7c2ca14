use axum::{routing::get, Router};

use crate::handlers::pricing::{get_pricing, update_pricing};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/pricing", get(get_pricing).put(update_pricing))
}
