// handlers/elevated/tenants/show.rs - GET /admin/tenants/:id handler

use axum::extract::State;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Tenant;
use crate::middleware::{ApiPath, ApiResponse, ApiResult};

pub async fn tenant_show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Tenant> {
    let tenant = state.tenants.get(id).await?;
    Ok(ApiResponse::success(tenant))
}
