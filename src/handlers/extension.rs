use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::instrument;

use crate::dtos::extension::{ImportProductRequest, ImportProductResponse};
use crate::dtos::response::ApiResponse;
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::services::extension::ExtensionService;
use crate::state::AppState;

// POST /extension/import: 201 when a product was created, 200 when an
// existing one got the price.
#[instrument(skip(state, auth, payload))]
pub async fn import_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<ImportProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ImportProductResponse>>), AppError> {
    let svc = ExtensionService::new(state.repo(auth.user_id), &state.categories);
    let (product, created) = svc.import(payload).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(ApiResponse::ok(ImportProductResponse { product: product.into(), created }))))
}
