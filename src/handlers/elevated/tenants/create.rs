// handlers/elevated/tenants/create.rs - POST /admin/tenants handler

use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::auth::PlatformContext;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::tenant_service::{ProvisionTenantRequest, TenantInvite};

/// Provision a tenant in `trial` with an invited owner.
///
/// Input:
/// ```json
/// {
///   "name": "Acme Corp",
///   "slug": "acme",
///   "ownerName": "Olive Owner",
///   "ownerEmail": "olive@acme.test",
///   "contact": { "phone": "..." },
///   "business": { "verticals": ["retail"] },
///   "quota": { "maxUsers": 10, "maxProducts": 500 }
/// }
/// ```
///
/// The response carries the raw `inviteToken`. It is shown only here.
pub async fn tenant_create(
    State(state): State<AppState>,
    Extension(ctx): Extension<PlatformContext>,
    ApiJson(request): ApiJson<ProvisionTenantRequest>,
) -> ApiResult<TenantInvite> {
    let invite = state.tenants.provision(&ctx, request).await?;
    Ok(ApiResponse::created(invite))
}
