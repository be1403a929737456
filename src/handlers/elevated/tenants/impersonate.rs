// handlers/elevated/tenants/impersonate.rs - POST /admin/tenants/:id/impersonate handler

use axum::{extract::State, Extension};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::PlatformContext;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::services::tenant_service::{ImpersonateRequest, ImpersonationSession};

/// Open a time-boxed tenant session as one of the tenant's active users.
///
/// Input: `{ "userId": "...", "durationMinutes": 15 }`
///
/// The token has `session = "impersonation"` and `actor` set to the
/// super admin, so every audit event it produces is attributable.
pub async fn tenant_impersonate(
    State(state): State<AppState>,
    Extension(ctx): Extension<PlatformContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<ImpersonateRequest>,
) -> ApiResult<ImpersonationSession> {
    let session = state.tenants.impersonate(&ctx, id, request).await?;
    Ok(ApiResponse::success(session))
}
