// handlers/elevated/tenants/list.rs - GET /admin/tenants handler

use axum::extract::State;

use crate::app::AppState;
use crate::database::models::Tenant;
use crate::middleware::{ApiList, ApiListResult};

pub async fn tenant_list(State(state): State<AppState>) -> ApiListResult<Tenant> {
    let tenants = state.tenants.list().await?;
    Ok(ApiList::new(tenants, "Tenants retrieved successfully"))
}
