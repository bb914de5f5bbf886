use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::create_token;
use crate::database::models::{NewUser, User, UserPatch};
use crate::middleware::{ApiPath, ApiResponse, ApiResult, ValidatedJson};

/// POST /users (admin) - Unlike registration, this may create administrators.
/// Returns the new user together with a token for them.
pub async fn create(State(state): State<AppState>, ValidatedJson(data): ValidatedJson<NewUser>) -> ApiResult<Value> {
    let user = User::register(&state.pool, data, state.config.security.bcrypt_cost).await?;
    let token = create_token(&user.username, user.is_admin, &state.config.security)?;
    Ok(ApiResponse::created(json!({ "user": user, "token": token })))
}

/// GET /users (admin)
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let users = User::find_all(&state.pool).await?;
    Ok(ApiResponse::success(json!({ "users": users })))
}

/// GET /users/:username (admin or owner)
pub async fn get(State(state): State<AppState>, ApiPath(username): ApiPath<String>) -> ApiResult<Value> {
    let user = User::get(&state.pool, &username).await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

/// PATCH /users/:username (admin or owner)
pub async fn update(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
    ValidatedJson(patch): ValidatedJson<UserPatch>,
) -> ApiResult<Value> {
    let user = User::update(&state.pool, &username, patch, state.config.security.bcrypt_cost).await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

/// DELETE /users/:username (admin or owner)
pub async fn remove(State(state): State<AppState>, ApiPath(username): ApiPath<String>) -> ApiResult<Value> {
    User::remove(&state.pool, &username).await?;
    Ok(ApiResponse::success(json!({ "deleted": username })))
}
