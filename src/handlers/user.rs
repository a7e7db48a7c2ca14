use axum::extract::{Extension, State};
use axum::http::HeaderMap;
use axum::Json;
use bcrypt::{hash, verify};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::jwt::{sign_token, verify_token};
use crate::dtos::response::{created, ok, ApiResult, Created};
use crate::dtos::user::{LoginRequest, LoginResponse, RegisterUserRequest, UserResponse};
use crate::error::AppError;
use crate::middleware::auth::{bearer_token, AuthContext};
use crate::models::user::{User, ROLES};
use crate::services::{Entity, Record};
use crate::state::AppState;
use crate::store::Filter;

// Accounts are not owned by anyone; they sit under the nil owner id.
async fn find_by_username(state: &AppState, username: &str) -> Result<Option<Record<User>>, AppError> {
    let filter = Filter::owned_by(Uuid::nil()).eq("username", username);
    state
        .store
        .query(User::COLLECTION, &filter)
        .await?
        .into_iter()
        .next()
        .map(Record::from_document)
        .transpose()
}

// The first account may make itself admin; after that only an admin's
// bearer token can grant the role.
async fn check_admin_grant(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let users = state.store.query(User::COLLECTION, &Filter::owned_by(Uuid::nil())).await?;
    if users.is_empty() {
        return Ok(());
    }
    let token = bearer_token(headers).map_err(|_| AppError::forbidden("Only an admin can grant the admin role"))?;
    let claims = verify_token(token, &state.config.jwt_secret)?;
    if claims.role != "admin" {
        return Err(AppError::forbidden("Only an admin can grant the admin role"));
    }
    Ok(())
}

#[instrument(skip(state, headers, payload))]
pub async fn register_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RegisterUserRequest>,
) -> Created<UserResponse> {
    let role = payload.role.unwrap_or_else(|| "member".to_string());
    if !ROLES.contains(&role.as_str()) {
        return Err(AppError::validation("Invalid role"));
    }
    if role == "admin" {
        check_admin_grant(&state, &headers).await?;
    }
    let username = payload.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::validation("Username required"));
    }
    if payload.password.len() < 6 {
        return Err(AppError::validation("Password too short"));
    }
    if find_by_username(&state, &username).await?.is_some() {
        return Err(AppError::conflict("Username already exists"));
    }

    let password_hash = hash(&payload.password, state.config.bcrypt_cost)
        .map_err(|e| AppError::internal(format!("Hash error: {e}")))?;
    let user = User { username, password_hash, role, is_active: true };
    let doc = state
        .store
        .insert(User::COLLECTION, Uuid::nil(), serde_json::to_value(&user)?)
        .await?;
    let record = Record::<User>::from_document(doc)?;
    info!(id = %record.id, "user registered");

    created(UserResponse::from(record))
}

#[instrument(skip(state, payload))]
pub async fn login_user(State(state): State<AppState>, Json(payload): Json<LoginRequest>) -> ApiResult<LoginResponse> {
    if payload.username.trim().is_empty() {
        return Err(AppError::validation("Username required"));
    }
    if payload.password.is_empty() {
        return Err(AppError::validation("Password required"));
    }

    let user = find_by_username(&state, payload.username.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;
    if !user.data.is_active {
        return Err(AppError::forbidden("User inactive"));
    }

    let matches = verify(&payload.password, &user.data.password_hash)
        .map_err(|e| AppError::internal(format!("Password verify error: {e}")))?;
    if !matches {
        return Err(AppError::Unauthorized);
    }

    let ttl = state.config.token_ttl_hours;
    let token = sign_token(user.id, &user.data.role, &user.data.username, &state.config.jwt_secret, ttl)?;

    ok(LoginResponse { access_token: token, token_type: "Bearer", expires_in_seconds: ttl * 60 * 60 })
}

pub async fn get_me(State(state): State<AppState>, Extension(auth): Extension<AuthContext>) -> ApiResult<UserResponse> {
    let doc = state
        .store
        .get(User::COLLECTION, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    ok(UserResponse::from(Record::<User>::from_document(doc)?))
}
