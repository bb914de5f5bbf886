use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::{Company, CompanyFilter, CompanyPatch, NewCompany};
use crate::middleware::{ApiPath, ApiResponse, ApiResult, ValidatedJson, ValidatedQuery};

/// POST /companies (admin)
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(data): ValidatedJson<NewCompany>,
) -> ApiResult<Value> {
    let company = Company::create(&state.pool, data).await?;
    Ok(ApiResponse::created(json!({ "company": company })))
}

/// GET /companies?name=&minEmployees=&maxEmployees=
pub async fn list(
    State(state): State<AppState>,
    ValidatedQuery(filter): ValidatedQuery<CompanyFilter>,
) -> ApiResult<Value> {
    let companies = Company::find_all(&state.pool, &filter).await?;
    Ok(ApiResponse::success(json!({ "companies": companies })))
}

/// GET /companies/:handle
pub async fn get(State(state): State<AppState>, ApiPath(handle): ApiPath<String>) -> ApiResult<Value> {
    let company = Company::get(&state.pool, &handle).await?;
    Ok(ApiResponse::success(json!({ "company": company })))
}

/// PATCH /companies/:handle (admin)
pub async fn update(
    State(state): State<AppState>,
    ApiPath(handle): ApiPath<String>,
    ValidatedJson(patch): ValidatedJson<CompanyPatch>,
) -> ApiResult<Value> {
    let company = Company::update(&state.pool, &handle, patch).await?;
    Ok(ApiResponse::success(json!({ "company": company })))
}

/// DELETE /companies/:handle (admin)
pub async fn remove(State(state): State<AppState>, ApiPath(handle): ApiPath<String>) -> ApiResult<Value> {
    Company::remove(&state.pool, &handle).await?;
    Ok(ApiResponse::success(json!({ "deleted": handle })))
}
