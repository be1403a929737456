// handlers/protected/products.rs - /products handlers
//
// Reads are open to every role; writes need owner or manager. A `tenantId`
// in a body or query string is only compared against the token, never used
// for scoping.

use axum::{extract::State, Extension};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::TenantContext;
use crate::middleware::{ApiJson, ApiList, ApiListResult, ApiPath, ApiQuery, ApiResponse, ApiResult};
use crate::services::inventory_service::{ProductInput, ProductQuery, ProductView, TenantQuery};

/// POST /products
///
/// Required: `name, categoryId, sku, costPrice, sellingPrice, quantity,
/// unit, reorderLevel, supplierName`. Optional: `status, image, tenantId`.
/// Returns 201 with the product, including the computed `isLowStock`.
pub async fn product_create(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<ProductView> {
    let product = state.inventory.create_product(&ctx, input).await?;
    Ok(ApiResponse::created(product))
}

/// GET /products?categoryId=&status=&supplierName=&unit=&minPrice=&maxPrice=&lowStock=&search=
///
/// Filters narrow the tenant's products; none of them can widen the scope.
pub async fn product_list(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiListResult<ProductView> {
    let products = state.inventory.list_products(&ctx, query).await?;
    Ok(ApiList::new(products, "Products retrieved successfully"))
}

/// GET /products/:id
pub async fn product_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<TenantQuery>,
) -> ApiResult<ProductView> {
    let product = state.inventory.get_product(&ctx, id, query).await?;
    Ok(ApiResponse::success(product))
}

/// PUT /products/:id
pub async fn product_update(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<ProductView> {
    let product = state.inventory.update_product(&ctx, id, input).await?;
    Ok(ApiResponse::success(product))
}

/// DELETE /products/:id
///
/// A second delete of the same id answers 404.
pub async fn product_delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<TenantQuery>,
) -> ApiResult<Value> {
    state.inventory.delete_product(&ctx, id, query).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
