// handlers/public/admin_login.rs - POST /admin/login handler

use axum::extract::State;

use crate::app::AppState;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::auth_service::{AdminLoginRequest, PlatformSession};

/// Super-admin login. Returns a platform token, which tenant routes refuse.
pub async fn admin_login_post(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AdminLoginRequest>,
) -> ApiResult<PlatformSession> {
    let session = state.auth.admin_login(request).await?;
    Ok(ApiResponse::success(session))
}
