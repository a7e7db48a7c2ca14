use axum::{routing::{get, post, put}, Router};

use crate::handlers::estimate::{
    add_attachments, create_change_order, create_estimate, delete_estimate, get_estimate, get_estimates,
    set_payment_schedule, transition_estimate, update_estimate,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/estimates", get(get_estimates).post(create_estimate))
        .route("/estimates/{id}", get(get_estimate).put(update_estimate).delete(delete_estimate))
        .route("/estimates/{id}/status", post(transition_estimate))
        .route("/estimates/{id}/change-orders", post(create_change_order))
        .route("/estimates/{id}/attachments", post(add_attachments))
        .route("/estimates/{id}/payment-schedule", put(set_payment_schedule))
}
