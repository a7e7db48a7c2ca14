use axum::extract::{Extension, State};
use axum::Json;
use tracing::instrument;

use crate::dtos::pricing::UpdatePricingRequest;
use crate::dtos::response::{ok, ApiResult};
use crate::middleware::auth::AuthContext;
use crate::models::pricing::PricingSettings;
use crate::services::pricing::PricingService;
use crate::state::AppState;

#[instrument(skip(state, auth))]
pub async fn get_pricing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<PricingSettings> {
    ok(PricingService::new(state.repo(auth.user_id)).get().await?)
}

#[instrument(skip(state, auth))]
pub async fn update_pricing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<UpdatePricingRequest>,
) -> ApiResult<PricingSettings> {
    ok(PricingService::new(state.repo(auth.user_id)).update(payload).await?)
}
