use axum::extract::{Extension, Path, State};
use axum::Json;
use tracing::instrument;
use uuid::Uuid;

use crate::dtos::response::{created, ok, ApiResult, Created};
use crate::dtos::supplier::{CreateNamedRequest, UpdateNamedRequest};
use crate::middleware::auth::AuthContext;
use crate::models::supplier::NamedRecord;
use crate::services::suppliers::SupplierService;
use crate::services::Record;
use crate::state::AppState;

fn service<'a>(state: &'a AppState, auth: &AuthContext) -> SupplierService<'a> {
    SupplierService::new(state.repo(auth.user_id))
}

// Stores and brands share their list/get/create/update handlers.

pub async fn list_named<T: NamedRecord>(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Vec<Record<T>>> {
    ok(service(&state, &auth).list::<T>().await?)
}

pub async fn get_named<T: NamedRecord>(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Record<T>> {
    ok(service(&state, &auth).get::<T>(id).await?)
}

pub async fn create_named<T: NamedRecord>(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateNamedRequest>,
) -> Created<Record<T>> {
    created(service(&state, &auth).create::<T>(payload).await?)
}

pub async fn update_named<T: NamedRecord>(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateNamedRequest>,
) -> ApiResult<Record<T>> {
    ok(service(&state, &auth).update::<T>(id, payload).await?)
}

#[instrument(skip(state, auth))]
pub async fn delete_store(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    service(&state, &auth).delete_store(id).await?;
    ok(())
}

#[instrument(skip(state, auth))]
pub async fn delete_brand(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    service(&state, &auth).delete_brand(id).await?;
    ok(())
}
