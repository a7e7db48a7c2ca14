use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use tracing::instrument;
use uuid::Uuid;

use crate::dtos::estimate::{
    AttachmentsRequest, ChangeOrderRequest, CreateEstimateRequest, EstimateQuery, EstimateResponse,
    TransitionRequest, UpdateEstimateRequest,
};
use crate::dtos::response::{created, ok, ApiResult, Created};
use crate::middleware::auth::AuthContext;
use crate::models::payment_schedule::PaymentSchedule;
use crate::services::estimates::EstimateService;
use crate::state::AppState;

fn service<'a>(state: &'a AppState, auth: &AuthContext) -> EstimateService<'a> {
    EstimateService::new(state.repo(auth.user_id))
}

// GET /estimates?status=&parent_id=
#[instrument(skip(state, auth))]
pub async fn get_estimates(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<EstimateQuery>,
) -> ApiResult<Vec<EstimateResponse>> {
    let estimates = service(&state, &auth).list(&query).await?;
    ok(estimates.into_iter().map(EstimateResponse::from).collect())
}

#[instrument(skip(state, auth))]
pub async fn get_estimate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<EstimateResponse> {
    ok(service(&state, &auth).get(id).await?.into())
}

#[instrument(skip(state, auth, payload))]
pub async fn create_estimate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateEstimateRequest>,
) -> Created<EstimateResponse> {
    created(service(&state, &auth).create(payload).await?.into())
}

#[instrument(skip(state, auth, payload))]
pub async fn update_estimate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEstimateRequest>,
) -> ApiResult<EstimateResponse> {
    ok(service(&state, &auth).update(id, payload).await?.into())
}

#[instrument(skip(state, auth))]
pub async fn delete_estimate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    service(&state, &auth).delete(id).await?;
    ok(())
}

// POST /estimates/{id}/status
#[instrument(skip(state, auth))]
pub async fn transition_estimate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionRequest>,
) -> ApiResult<EstimateResponse> {
    ok(service(&state, &auth).transition(id, payload.status).await?.into())
}

// POST /estimates/{id}/change-orders
#[instrument(skip(state, auth, payload))]
pub async fn create_change_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeOrderRequest>,
) -> Created<EstimateResponse> {
    created(service(&state, &auth).create_change_order(id, payload).await?.into())
}

// POST /estimates/{id}/attachments
#[instrument(skip(state, auth, payload))]
pub async fn add_attachments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttachmentsRequest>,
) -> ApiResult<EstimateResponse> {
    ok(service(&state, &auth).add_attachments(id, payload).await?.into())
}

// PUT /estimates/{id}/payment-schedule
#[instrument(skip(state, auth, payload))]
pub async fn set_payment_schedule(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentSchedule>,
) -> ApiResult<EstimateResponse> {
    ok(service(&state, &auth).set_payment_schedule(id, payload).await?.into())
}
