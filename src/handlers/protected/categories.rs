// handlers/protected/categories.rs - /categories handlers

use axum::{extract::State, Extension};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::TenantContext;
use crate::database::models::Category;
use crate::middleware::{ApiJson, ApiList, ApiListResult, ApiPath, ApiQuery, ApiResponse, ApiResult};
use crate::services::inventory_service::{CategoryInput, TenantQuery};

/// POST /categories - `{ "name": "...", "description": "..." }`
pub async fn category_create(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> ApiResult<Category> {
    let category = state.inventory.create_category(&ctx, input).await?;
    Ok(ApiResponse::created(category))
}

pub async fn category_list(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ApiQuery(query): ApiQuery<TenantQuery>,
) -> ApiListResult<Category> {
    let categories = state.inventory.list_categories(&ctx, query).await?;
    Ok(ApiList::new(categories, "Categories retrieved successfully"))
}

pub async fn category_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<TenantQuery>,
) -> ApiResult<Category> {
    let category = state.inventory.get_category(&ctx, id, query).await?;
    Ok(ApiResponse::success(category))
}

pub async fn category_update(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> ApiResult<Category> {
    let category = state.inventory.update_category(&ctx, id, input).await?;
    Ok(ApiResponse::success(category))
}

/// DELETE /categories/:id - 409 while products still reference it.
pub async fn category_delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<TenantQuery>,
) -> ApiResult<Value> {
    state.inventory.delete_category(&ctx, id, query).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
