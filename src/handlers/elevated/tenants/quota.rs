// handlers/elevated/tenants/quota.rs - PUT /admin/tenants/:id/quota handler

use axum::{extract::State, Extension};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::PlatformContext;
use crate::database::models::{Tenant, TenantQuota};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};

/// Replace the quota. Omitted or `null` limits mean unlimited.
///
/// Input: `{ "maxUsers": 25, "maxProducts": null }`
pub async fn tenant_quota(
    State(state): State<AppState>,
    Extension(ctx): Extension<PlatformContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(quota): ApiJson<TenantQuota>,
) -> ApiResult<Tenant> {
    let tenant = state.tenants.set_quota(&ctx, id, quota).await?;
    Ok(ApiResponse::success(tenant))
}
