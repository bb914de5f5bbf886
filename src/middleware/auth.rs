use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::app::AppState;
use crate::auth::{decode_token, Claims};

/// Caller identity taken from a valid bearer token
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub username: String,
    pub is_admin: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }
}

/// Attach an [`AuthUser`] to the request when a valid token is present.
///
/// A missing or invalid token is not an error here; the per-route guards
/// decide whether anonymous callers may continue.
pub async fn authenticate_jwt(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if let Some(token) = extract_bearer_token(request.headers()) {
        match decode_token(&token, &state.config.security.jwt_secret) {
            Ok(claims) => {
                request.extensions_mut().insert(AuthUser::from(claims));
            }
            Err(e) => debug!("Ignoring bearer token: {}", e),
        }
    }

    next.run(request).await
}

/// Extract the token from `Authorization: Bearer <token>`; the scheme is
/// accepted as `Bearer` or `bearer`.
fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .or_else(|| auth_str.strip_prefix("bearer "))
        .unwrap_or(auth_str)
        .trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
