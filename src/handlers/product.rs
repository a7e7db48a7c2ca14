use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use tracing::instrument;
use uuid::Uuid;

use crate::dtos::product::{
    AdjustStockRequest, CreateProductRequest, ProductQuery, ProductResponse, UpdateProductRequest,
    UpsertStorePriceRequest,
};
use crate::dtos::response::{created, ok, ApiResult, Created};
use crate::middleware::auth::AuthContext;
use crate::services::products::ProductService;
use crate::state::AppState;

fn service<'a>(state: &'a AppState, auth: &AuthContext) -> ProductService<'a> {
    ProductService::new(state.repo(auth.user_id), &state.categories)
}

// GET /products
#[instrument(skip(state, auth))]
pub async fn get_products(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Vec<ProductResponse>> {
    let products = service(&state, &auth).list(&query).await?;
    ok(products.into_iter().map(ProductResponse::from).collect())
}

// GET /products/{id}
#[instrument(skip(state, auth))]
pub async fn get_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<ProductResponse> {
    ok(service(&state, &auth).get(id).await?.into())
}

// POST /products
#[instrument(skip(state, auth, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateProductRequest>,
) -> Created<ProductResponse> {
    created(service(&state, &auth).create(payload).await?.into())
}

// PUT /products/{id}
#[instrument(skip(state, auth, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> ApiResult<ProductResponse> {
    ok(service(&state, &auth).update(id, payload).await?.into())
}

// DELETE /products/{id}
#[instrument(skip(state, auth))]
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    service(&state, &auth).delete(id).await?;
    ok(())
}

// POST /products/{id}/stock
#[instrument(skip(state, auth))]
pub async fn adjust_stock(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustStockRequest>,
) -> ApiResult<ProductResponse> {
    ok(service(&state, &auth).adjust_stock(id, &payload).await?.into())
}

// PUT /products/{id}/prices/{store_id}
#[instrument(skip(state, auth, payload))]
pub async fn upsert_store_price(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((id, store_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpsertStorePriceRequest>,
) -> ApiResult<ProductResponse> {
    ok(service(&state, &auth).upsert_store_price(id, store_id, payload).await?.into())
}

// DELETE /products/{id}/prices/{store_id}
#[instrument(skip(state, auth))]
pub async fn remove_store_price(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((id, store_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<ProductResponse> {
    ok(service(&state, &auth).remove_store_price(id, store_id).await?.into())
}
