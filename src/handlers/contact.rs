//! Clients and employees. Employee records are only writable by admins.

use axum::extract::{Extension, Path, State};
use axum::Json;
use tracing::instrument;
use uuid::Uuid;

use crate::dtos::contact::{CreateClientRequest, CreateEmployeeRequest, UpdateClientRequest, UpdateEmployeeRequest};
use crate::dtos::response::{created, ok, ApiResult, Created};
use crate::middleware::auth::AuthContext;
use crate::models::contact::{Client, Employee};
use crate::services::contacts::ContactService;
use crate::services::Record;
use crate::state::AppState;

fn service<'a>(state: &'a AppState, auth: &AuthContext) -> ContactService<'a> {
    ContactService::new(state.repo(auth.user_id))
}

#[instrument(skip(state, auth))]
pub async fn get_clients(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Vec<Record<Client>>> {
    ok(service(&state, &auth).list_clients().await?)
}

#[instrument(skip(state, auth))]
pub async fn get_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Record<Client>> {
    ok(service(&state, &auth).get_client(id).await?)
}

#[instrument(skip(state, auth, payload))]
pub async fn create_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateClientRequest>,
) -> Created<Record<Client>> {
    created(service(&state, &auth).create_client(payload).await?)
}

#[instrument(skip(state, auth, payload))]
pub async fn update_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClientRequest>,
) -> ApiResult<Record<Client>> {
    ok(service(&state, &auth).update_client(id, payload).await?)
}

#[instrument(skip(state, auth))]
pub async fn delete_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    service(&state, &auth).delete_client(id).await?;
    ok(())
}

#[instrument(skip(state, auth))]
pub async fn get_employees(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Vec<Record<Employee>>> {
    ok(service(&state, &auth).list_employees().await?)
}

#[instrument(skip(state, auth))]
pub async fn get_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Record<Employee>> {
    ok(service(&state, &auth).get_employee(id).await?)
}

#[instrument(skip(state, auth, payload))]
pub async fn create_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateEmployeeRequest>,
) -> Created<Record<Employee>> {
    auth.require_admin()?;
    created(service(&state, &auth).create_employee(payload).await?)
}

#[instrument(skip(state, auth, payload))]
pub async fn update_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmployeeRequest>,
) -> ApiResult<Record<Employee>> {
    auth.require_admin()?;
    ok(service(&state, &auth).update_employee(id, payload).await?)
}

#[instrument(skip(state, auth))]
pub async fn delete_employee(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    auth.require_admin()?;
    service(&state, &auth).delete_employee(id).await?;
    ok(())
}
