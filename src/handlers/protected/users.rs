// handlers/protected/users.rs - /users handlers (owner gate)

use axum::{extract::State, Extension};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::TenantContext;
use crate::database::models::User;
use crate::middleware::{ApiJson, ApiList, ApiListResult, ApiPath, ApiResponse, ApiResult};
use crate::services::user_service::{ActivateUserInput, NewUserInput};

pub async fn user_list(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
) -> ApiListResult<User> {
    let users = state.users.list(&ctx).await?;
    Ok(ApiList::new(users, "Users retrieved successfully"))
}

/// POST /users
///
/// Input: `{ "name": "...", "email": "...", "role": "manager|staff", "password"?: "..." }`
///
/// Without a password the user starts `invited`; with one, `active`.
pub async fn user_create(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ApiJson(input): ApiJson<NewUserInput>,
) -> ApiResult<User> {
    let user = state.users.create(&ctx, input).await?;
    Ok(ApiResponse::created(user))
}

pub async fn user_suspend(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<User> {
    let user = state.users.suspend(&ctx, id).await?;
    Ok(ApiResponse::success(user))
}

/// POST /users/:id/activate
///
/// Input (optional): `{ "password": "..." }`. Invited users need a
/// password here; suspended users keep theirs when it is omitted.
pub async fn user_activate(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    ApiPath(id): ApiPath<Uuid>,
    input: Option<ApiJson<ActivateUserInput>>,
) -> ApiResult<User> {
    let input = input.map(|ApiJson(input)| input).unwrap_or_default();
    let user = state.users.activate(&ctx, id, input).await?;
    Ok(ApiResponse::success(user))
}
