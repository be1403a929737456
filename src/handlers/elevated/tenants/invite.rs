// handlers/elevated/tenants/invite.rs - POST /admin/tenants/:id/invite handler

use axum::{extract::State, Extension};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::PlatformContext;
use crate::middleware::{ApiPath, ApiResponse, ApiResult};
use crate::services::tenant_service::TenantInvite;

/// Issue a new owner invite, replacing the pending one. 409 once the
/// invite has been accepted.
pub async fn tenant_invite(
    State(state): State<AppState>,
    Extension(ctx): Extension<PlatformContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<TenantInvite> {
    let invite = state.tenants.reissue_invite(&ctx, id).await?;
    Ok(ApiResponse::success(invite))
}
