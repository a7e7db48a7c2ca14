use axum::{routing::{get, post}, Router};

use crate::handlers::user::{get_me, login_user, register_user};
use crate::state::AppState;

pub fn open_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register_user))
        .route("/users/login", post(login_user))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me))
}
