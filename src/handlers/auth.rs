use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::create_token;
use crate::database::models::{Credentials, RegisterUser, User};
use crate::middleware::{ApiResponse, ApiResult, ValidatedJson};

/// POST /auth/token - Exchange a username and password for a JWT
pub async fn token(
    State(state): State<AppState>,
    ValidatedJson(credentials): ValidatedJson<Credentials>,
) -> ApiResult<Value> {
    let user = User::authenticate(&state.pool, &credentials.username, &credentials.password).await?;
    let token = create_token(&user.username, user.is_admin, &state.config.security)?;
    Ok(ApiResponse::success(json!({ "token": token })))
}

/// POST /auth/register - Create a non-admin account and log it in
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(data): ValidatedJson<RegisterUser>,
) -> ApiResult<Value> {
    let user = User::register(&state.pool, data.into(), state.config.security.bcrypt_cost).await?;
    let token = create_token(&user.username, user.is_admin, &state.config.security)?;
    Ok(ApiResponse::created(json!({ "token": token })))
}
