use axum::{extract::Request, middleware::Next, response::Response};

use crate::auth::TenantContext;
use crate::database::models::{Role, TenantStatus};
use crate::error::ApiError;

/// Owner-only administrative routes. Runs behind `tenant_guard` and
/// additionally requires an active (not trial) tenant.
pub async fn owner_gate(request: Request, next: Next) -> Result<Response, ApiError> {
    let context = request
        .extensions()
        .get::<TenantContext>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    context.ensure_role(&[Role::Owner])?;

    if context.tenant_status != TenantStatus::Active {
        tracing::warn!(
            "Owner route refused for tenant {} in status {}",
            context.tenant_id(),
            context.tenant_status
        );
        return Err(ApiError::forbidden("Tenant account is not active"));
    }

    Ok(next.run(request).await)
}
