pub mod categories;
pub mod contacts;
pub mod estimates;
pub mod extension;
pub mod labor;
pub mod pricing;
pub mod products;
pub mod projects;
pub mod suppliers;
pub mod users;

use axum::{middleware, Router};

use crate::middleware::auth::require_auth;
use crate::state::AppState;

/// Everything except register/login sits behind the bearer-token check.
pub fn create_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(users::routes())
        .merge(categories::routes())
        .merge(products::routes())
        .merge(labor::routes())
        .merge(estimates::routes())
        .merge(projects::routes())
        .merge(contacts::routes())
        .merge(suppliers::routes())
        .merge(pricing::routes())
        .merge(extension::routes())
        .layer(middleware::from_fn_with_state(state, require_auth));

    Router::new().merge(users::open_routes()).merge(protected)
}
