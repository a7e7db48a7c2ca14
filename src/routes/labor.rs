use axum::{routing::{delete, get, post, put}, Router};

use crate::handlers::labor::{
    add_task, create_labor_item, delete_labor_item, get_labor_item, get_labor_items, remove_task, reorder_tasks,
    update_labor_item,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/labor-items", get(get_labor_items).post(create_labor_item))
        .route("/labor-items/{id}", get(get_labor_item).put(update_labor_item).delete(delete_labor_item))
        .route("/labor-items/{id}/tasks", post(add_task))
        .route("/labor-items/{id}/tasks/order", put(reorder_tasks))
        .route("/labor-items/{id}/tasks/{task_id}", delete(remove_task))
}
