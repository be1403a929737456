// handlers/elevated/tenants/status.rs - POST /admin/tenants/:id/{suspend,activate}
//
// Suspension takes effect on the next request: the tenant guard re-reads
// the tenant every time, so outstanding tokens stop working at once.

use axum::{extract::State, Extension};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::PlatformContext;
use crate::database::models::Tenant;
use crate::middleware::{ApiPath, ApiResponse, ApiResult};

pub async fn tenant_suspend(
    State(state): State<AppState>,
    Extension(ctx): Extension<PlatformContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Tenant> {
    let tenant = state.tenants.suspend(&ctx, id).await?;
    Ok(ApiResponse::success(tenant))
}

pub async fn tenant_activate(
    State(state): State<AppState>,
    Extension(ctx): Extension<PlatformContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Tenant> {
    let tenant = state.tenants.activate(&ctx, id).await?;
    Ok(ApiResponse::success(tenant))
}
