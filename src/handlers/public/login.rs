// handlers/public/login.rs - POST /login handler

use axum::extract::State;

use crate::app::AppState;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::auth_service::{LoginRequest, TenantSession};

/// Authenticate a tenant user and receive a tenant token.
///
/// Input: `{ "slug": "acme", "email": "olive@acme.test", "password": "..." }`
///
/// Output:
/// ```json
/// {
///   "success": true,
///   "data": { "token": "eyJ...", "expiresAt": "...", "user": { ... }, "tenant": { ... } }
/// }
/// ```
///
/// Failures carry `errorField`: `slug` (COMPANY_NOT_FOUND), `email`
/// (USER_NOT_FOUND), `password` (INVALID_PASSWORD) or `general`
/// (ACCOUNT_SUSPENDED).
pub async fn login_post(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<TenantSession> {
    let session = state.auth.login(request).await?;
    Ok(ApiResponse::success(session))
}
