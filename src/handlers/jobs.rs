use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::{Job, JobFilter, JobPatch, NewJob};
use crate::middleware::{ApiPath, ApiResponse, ApiResult, ValidatedJson, ValidatedQuery};

/// POST /jobs (admin)
pub async fn create(State(state): State<AppState>, ValidatedJson(data): ValidatedJson<NewJob>) -> ApiResult<Value> {
    let job = Job::create(&state.pool, data).await?;
    Ok(ApiResponse::created(json!({ "job": job })))
}

/// GET /jobs?title=&minSalary=&hasEquity=&companyHandle=
pub async fn list(
    State(state): State<AppState>,
    ValidatedQuery(filter): ValidatedQuery<JobFilter>,
) -> ApiResult<Value> {
    let jobs = Job::find_all(&state.pool, &filter).await?;
    Ok(ApiResponse::success(json!({ "jobs": jobs })))
}

/// GET /jobs/:id
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> ApiResult<Value> {
    let job = Job::get(&state.pool, id).await?;
    Ok(ApiResponse::success(json!({ "job": job })))
}

/// PATCH /jobs/:id (admin)
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(patch): ValidatedJson<JobPatch>,
) -> ApiResult<Value> {
    let job = Job::update(&state.pool, id, patch).await?;
    Ok(ApiResponse::success(json!({ "job": job })))
}

/// DELETE /jobs/:id (admin)
pub async fn remove(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> ApiResult<Value> {
    Job::remove(&state.pool, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": id })))
}
