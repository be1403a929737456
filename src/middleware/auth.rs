use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{PlatformContext, TenantContext};
use crate::database::models::TenantStatus;
use crate::error::ApiError;

/// Tenant-scope guard. Verifies the bearer token as a tenant session,
/// re-reads the tenant and attaches a `TenantContext`. Every rejection
/// happens before the handler runs.
pub async fn tenant_guard(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(request.headers()).map_err(ApiError::unauthorized)?;
    let claims = state.credentials.verify_tenant_token(&token)?;

    let tenant = state.store.find_tenant(claims.tenant_id).await?.ok_or_else(|| {
        tracing::warn!("Token presented for unknown tenant {}", claims.tenant_id);
        ApiError::unauthorized("Invalid token")
    })?;

    if tenant.status == TenantStatus::Suspended {
        tracing::warn!("Rejected request for suspended tenant {}", tenant.id);
        return Err(ApiError::forbidden("Tenant account is suspended"));
    }

    let context = TenantContext::new(&claims, tenant.status);
    tracing::debug!(
        "Tenant session: user {} tenant {} ({})",
        context.user_id,
        context.tenant_id(),
        context.session.as_str()
    );

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

/// Super-admin guard. Only platform-audience tokens pass, and the admin
/// must still exist.
pub async fn platform_guard(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(request.headers()).map_err(ApiError::unauthorized)?;
    let claims = state.credentials.verify_platform_token(&token)?;

    if state.store.find_super_admin(claims.sub).await?.is_none() {
        tracing::warn!("Platform token presented for unknown super admin {}", claims.sub);
        return Err(ApiError::unauthorized("Invalid token"));
    }

    request.extensions_mut().insert(PlatformContext::new(claims));
    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
