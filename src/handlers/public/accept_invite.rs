// handlers/public/accept_invite.rs - POST /accept-invite handler

use axum::extract::State;

use crate::app::AppState;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::auth_service::{AcceptInviteRequest, TenantSession};

/// Consume an owner invite, set the owner password and log in.
///
/// Input: `{ "inviteToken": "...", "password": "..." }`
///
/// A token that is unknown, expired or already used yields
/// 400 `INVALID_INVITE`.
pub async fn accept_invite_post(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AcceptInviteRequest>,
) -> ApiResult<TenantSession> {
    let session = state.auth.accept_invite(request).await?;
    Ok(ApiResponse::success(session))
}
