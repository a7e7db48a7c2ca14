use axum::{routing::{get, post}, Router};

use crate::handlers::project::{create_project, delete_project, get_project, get_projects, record_cost, update_project};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(get_projects).post(create_project))
        .route("/projects/{id}", get(get_project).put(update_project).delete(delete_project))
        .route("/projects/{id}/costs", post(record_cost))
}
