use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::handlers::{auth, companies, health, jobs, users};
use crate::middleware::{authenticate_jwt, ensure_admin, ensure_admin_or_owner};

/// Shared by every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self { pool, config: Arc::new(config) }
    }
}

pub fn app(state: AppState) -> Router {
    let api = &state.config.api;

    let mut router = Router::new()
        .route("/health", get(health::health))
        .merge(auth_routes())
        .merge(company_routes())
        .merge(job_routes())
        .merge(user_routes())
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), authenticate_jwt))
        .layer(DefaultBodyLimit::max(api.max_request_size_bytes));

    if api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if state.config.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/token", post(auth::token))
        .route("/auth/register", post(auth::register))
}

fn company_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/companies",
            get(companies::list).post(companies::create.layer(from_fn(ensure_admin))),
        )
        .route(
            "/companies/:handle",
            get(companies::get)
                .patch(companies::update.layer(from_fn(ensure_admin)))
                .delete(companies::remove.layer(from_fn(ensure_admin))),
        )
}

fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(jobs::list).post(jobs::create.layer(from_fn(ensure_admin))))
        .route(
            "/jobs/:id",
            get(jobs::get)
                .patch(jobs::update.layer(from_fn(ensure_admin)))
                .delete(jobs::remove.layer(from_fn(ensure_admin))),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(users::list.layer(from_fn(ensure_admin))).post(users::create.layer(from_fn(ensure_admin))),
        )
        .route(
            "/users/:username",
            get(users::get.layer(from_fn(ensure_admin_or_owner)))
                .patch(users::update.layer(from_fn(ensure_admin_or_owner)))
                .delete(users::remove.layer(from_fn(ensure_admin_or_owner))),
        )
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}
