use axum::{routing::get, Router};

use crate::handlers::contact::{
    create_client, create_employee, delete_client, delete_employee, get_client, get_clients, get_employee,
    get_employees, update_client, update_employee,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(get_clients).post(create_client))
        .route("/clients/{id}", get(get_client).put(update_client).delete(delete_client))
        .route("/employees", get(get_employees).post(create_employee))
        .route("/employees/{id}", get(get_employee).put(update_employee).delete(delete_employee))
}
