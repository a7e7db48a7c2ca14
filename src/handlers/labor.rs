use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use tracing::instrument;
use uuid::Uuid;

use crate::dtos::labor::{AddTaskRequest, CreateLaborItemRequest, LaborQuery, ReorderTasksRequest, UpdateLaborItemRequest};
use crate::dtos::response::{created, ok, ApiResult, Created};
use crate::middleware::auth::AuthContext;
use crate::models::labor::LaborItem;
use crate::services::labor::LaborService;
use crate::services::Record;
use crate::state::AppState;

fn service<'a>(state: &'a AppState, auth: &AuthContext) -> LaborService<'a> {
    LaborService::new(state.repo(auth.user_id), &state.categories)
}

#[instrument(skip(state, auth))]
pub async fn get_labor_items(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<LaborQuery>,
) -> ApiResult<Vec<Record<LaborItem>>> {
    ok(service(&state, &auth).list(&query).await?)
}

#[instrument(skip(state, auth))]
pub async fn get_labor_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Record<LaborItem>> {
    ok(service(&state, &auth).get(id).await?)
}

#[instrument(skip(state, auth, payload))]
pub async fn create_labor_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateLaborItemRequest>,
) -> Created<Record<LaborItem>> {
    created(service(&state, &auth).create(payload).await?)
}

#[instrument(skip(state, auth, payload))]
pub async fn update_labor_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLaborItemRequest>,
) -> ApiResult<Record<LaborItem>> {
    ok(service(&state, &auth).update(id, payload).await?)
}

#[instrument(skip(state, auth))]
pub async fn delete_labor_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    service(&state, &auth).delete(id).await?;
    ok(())
}

// POST /labor-items/{id}/tasks
#[instrument(skip(state, auth, payload))]
pub async fn add_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddTaskRequest>,
) -> Created<Record<LaborItem>> {
    created(service(&state, &auth).add_task(id, &payload.description).await?)
}

// DELETE /labor-items/{id}/tasks/{task_id}
#[instrument(skip(state, auth))]
pub async fn remove_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Record<LaborItem>> {
    ok(service(&state, &auth).remove_task(id, task_id).await?)
}

// PUT /labor-items/{id}/tasks/order
#[instrument(skip(state, auth, payload))]
pub async fn reorder_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReorderTasksRequest>,
) -> ApiResult<Record<LaborItem>> {
    ok(service(&state, &auth).reorder_tasks(id, &payload.order).await?)
}
