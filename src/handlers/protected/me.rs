// handlers/protected/me.rs - GET /me handler

use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::auth::TenantContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::auth_service::Me;

/// Current user, tenant and session kind. Impersonated sessions also
/// report the acting super admin as `actor`.
pub async fn me_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> ApiResult<Me> {
    let me = state.auth.me(&ctx).await?;
    Ok(ApiResponse::success(me))
}
