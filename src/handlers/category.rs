use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use tracing::instrument;
use uuid::Uuid;

use crate::dtos::category::{AddOptionRequest, OptionsQuery};
use crate::dtos::response::{created, ok, ApiResult, Created};
use crate::handlers::parse_segment;
use crate::middleware::auth::AuthContext;
use crate::models::category::{CategoryKind, CategoryLevel, CategorySelection};
use crate::services::categories::{CategoryService, ResolvedHierarchy};
use crate::services::category_cache::CategoryOption;
use crate::state::AppState;

// GET /categories/{kind}/{level}?parent_id=
#[instrument(skip(state, auth))]
pub async fn list_options(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((kind, level)): Path<(String, String)>,
    Query(query): Query<OptionsQuery>,
) -> ApiResult<Vec<CategoryOption>> {
    let kind: CategoryKind = parse_segment(&kind)?;
    let level: CategoryLevel = parse_segment(&level)?;
    let svc = CategoryService::new(state.repo(auth.user_id), &state.categories);
    ok(svc.list_options(kind, level, query.parent_id).await?)
}

// POST /categories/{kind}/{level}
#[instrument(skip(state, auth, payload))]
pub async fn add_option(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((kind, level)): Path<(String, String)>,
    Json(payload): Json<AddOptionRequest>,
) -> Created<CategoryOption> {
    let kind: CategoryKind = parse_segment(&kind)?;
    let level: CategoryLevel = parse_segment(&level)?;
    let svc = CategoryService::new(state.repo(auth.user_id), &state.categories);
    created(svc.add_option(kind, level, payload.parent_id, &payload.name).await?)
}

// POST /categories/{kind}/resolve
#[instrument(skip(state, auth, selection))]
pub async fn resolve(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(kind): Path<String>,
    Json(selection): Json<CategorySelection>,
) -> ApiResult<ResolvedHierarchy> {
    let kind: CategoryKind = parse_segment(&kind)?;
    let svc = CategoryService::new(state.repo(auth.user_id), &state.categories);
    ok(svc.resolve(kind, &selection).await?)
}

// DELETE /categories/nodes/{id}
#[instrument(skip(state, auth))]
pub async fn delete_option(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let svc = CategoryService::new(state.repo(auth.user_id), &state.categories);
    svc.delete_option(id).await?;
    ok(())
}
