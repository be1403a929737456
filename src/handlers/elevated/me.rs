// handlers/elevated/me.rs - GET /admin/me handler

use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::auth::PlatformContext;
use crate::database::models::SuperAdmin;
use crate::middleware::{ApiResponse, ApiResult};

pub async fn admin_me_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<PlatformContext>,
) -> ApiResult<SuperAdmin> {
    let admin = state.auth.admin_me(&ctx).await?;
    Ok(ApiResponse::success(admin))
}
