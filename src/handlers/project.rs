use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use tracing::instrument;
use uuid::Uuid;

use crate::dtos::project::{CreateProjectRequest, ProjectQuery, ProjectResponse, RecordCostRequest, UpdateProjectRequest};
use crate::dtos::response::{created, ok, ApiResult, Created};
use crate::middleware::auth::AuthContext;
use crate::services::projects::ProjectService;
use crate::state::AppState;

fn service<'a>(state: &'a AppState, auth: &AuthContext) -> ProjectService<'a> {
    ProjectService::new(state.repo(auth.user_id))
}

#[instrument(skip(state, auth))]
pub async fn get_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ProjectQuery>,
) -> ApiResult<Vec<ProjectResponse>> {
    let projects = service(&state, &auth).list(&query).await?;
    ok(projects.into_iter().map(ProjectResponse::from).collect())
}

#[instrument(skip(state, auth))]
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<ProjectResponse> {
    ok(service(&state, &auth).get(id).await?.into())
}

#[instrument(skip(state, auth, payload))]
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateProjectRequest>,
) -> Created<ProjectResponse> {
    created(service(&state, &auth).create(payload).await?.into())
}

#[instrument(skip(state, auth, payload))]
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProjectRequest>,
) -> ApiResult<ProjectResponse> {
    ok(service(&state, &auth).update(id, payload).await?.into())
}

#[instrument(skip(state, auth))]
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    service(&state, &auth).delete(id).await?;
    ok(())
}

// POST /projects/{id}/costs
#[instrument(skip(state, auth))]
pub async fn record_cost(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordCostRequest>,
) -> ApiResult<ProjectResponse> {
    ok(service(&state, &auth).record_cost(id, &payload).await?.into())
}
