use std::collections::HashMap;

use axum::{
    extract::{Path, Request},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::auth::AuthUser;
use crate::error::ApiError;

pub const ADMIN_REQUIRED: &str = "Unauthorized, admin privileges required";
pub const ADMIN_OR_OWNER_REQUIRED: &str = "Unauthorized, admin or the user themselves required";

fn current_user(request: &Request) -> Option<AuthUser> {
    request.extensions().get::<AuthUser>().cloned()
}

/// Any valid token passes; anonymous callers get 401
pub async fn ensure_logged_in(request: Request, next: Next) -> Result<Response, ApiError> {
    if current_user(&request).is_none() {
        return Err(ApiError::unauthorized("Unauthorized"));
    }
    Ok(next.run(request).await)
}

/// Only administrators pass; everyone else, anonymous included, gets 403
pub async fn ensure_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    match current_user(&request) {
        Some(user) if user.is_admin => Ok(next.run(request).await),
        user => {
            warn!(
                "Admin route {} refused for {}",
                request.uri().path(),
                user.as_ref().map(|u| u.username.as_str()).unwrap_or("anonymous")
            );
            Err(ApiError::forbidden(ADMIN_REQUIRED))
        }
    }
}

/// Administrators, or the user named by the `:username` path segment
pub async fn ensure_admin_or_owner(
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = current_user(&request).ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    let is_owner = params.get("username").map(|name| name == &user.username).unwrap_or(false);
    if user.is_admin || is_owner {
        return Ok(next.run(request).await);
    }

    warn!("User {} refused access to {}", user.username, request.uri().path());
    Err(ApiError::forbidden(ADMIN_OR_OWNER_REQUIRED))
}
