// handlers/elevated/tenants/export.rs - GET /admin/tenants/:id/export handler

use axum::{extract::State, Extension};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::PlatformContext;
use crate::middleware::{ApiPath, ApiResponse, ApiResult};
use crate::services::tenant_service::TenantExport;

/// Tenant record with its users, categories and products. Credentials are
/// never part of the export.
pub async fn tenant_export(
    State(state): State<AppState>,
    Extension(ctx): Extension<PlatformContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<TenantExport> {
    let export = state.tenants.export(&ctx, id).await?;
    Ok(ApiResponse::success(export))
}
