use uuid::Uuid;

use super::{PlatformClaims, SessionKind, TenantClaims};
use crate::database::models::{Role, TenantStatus};
use crate::database::TenantScope;
use crate::error::ApiError;

/// Authenticated tenant principal, attached to the request by the tenant guard.
#[derive(Clone, Debug)]
pub struct TenantContext {
    pub scope: TenantScope,
    pub user_id: Uuid,
    pub role: Role,
    pub session: SessionKind,
    pub actor: Option<Uuid>,
    pub tenant_status: TenantStatus,
}

impl TenantContext {
    pub fn new(claims: &TenantClaims, tenant_status: TenantStatus) -> Self {
        Self {
            scope: TenantScope::from_claims(claims),
            user_id: claims.sub,
            role: claims.role,
            session: claims.session,
            actor: claims.actor,
            tenant_status,
        }
    }

    pub fn tenant_id(&self) -> Uuid {
        self.scope.tenant_id()
    }

    /// 403 unless the caller holds one of `allowed`. The message never lists them.
    pub fn ensure_role(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            tracing::warn!(
                "Role {} denied for user {} in tenant {}",
                self.role,
                self.user_id,
                self.tenant_id()
            );
            Err(ApiError::forbidden("Insufficient permissions"))
        }
    }

    /// Double-submit check for a client-supplied tenant id.
    pub fn confirm_tenant(&self, supplied: Option<Uuid>) -> Result<(), ApiError> {
        if self.scope.confirms(supplied) {
            Ok(())
        } else {
            tracing::warn!(
                "Tenant mismatch: user {} of tenant {} supplied {:?}",
                self.user_id,
                self.tenant_id(),
                supplied
            );
            Err(ApiError::TenantMismatch)
        }
    }
}

/// Authenticated super admin, attached to the request by the platform guard.
#[derive(Clone, Debug)]
pub struct PlatformContext {
    pub admin_id: Uuid,
    pub claims: PlatformClaims,
}

impl PlatformContext {
    pub fn new(claims: PlatformClaims) -> Self {
        Self { admin_id: claims.sub, claims }
    }

    /// Scope of a tenant this admin explicitly chose to act on.
    pub fn scope_for(&self, tenant_id: Uuid) -> TenantScope {
        TenantScope::for_platform(&self.claims, tenant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::TENANT_AUDIENCE;

    fn context(role: Role) -> TenantContext {
        let claims = TenantClaims {
            sub: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            role,
            session: SessionKind::Standard,
            actor: None,
            aud: TENANT_AUDIENCE.to_string(),
            iat: 0,
            exp: 0,
            jti: Uuid::new_v4(),
        };
        TenantContext::new(&claims, TenantStatus::Active)
    }

    #[test]
    fn role_gate_does_not_name_roles() {
        let staff = context(Role::Staff);
        let err = staff.ensure_role(&[Role::Owner, Role::Manager]).unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert!(!err.message().contains("owner"));
        assert!(!err.message().contains("manager"));
        assert!(context(Role::Manager).ensure_role(&[Role::Owner, Role::Manager]).is_ok());
    }

    #[test]
    fn mismatched_tenant_is_rejected() {
        let ctx = context(Role::Owner);
        assert!(ctx.confirm_tenant(None).is_ok());
        assert!(ctx.confirm_tenant(Some(ctx.tenant_id())).is_ok());
        let err = ctx.confirm_tenant(Some(Uuid::new_v4())).unwrap_err();
        assert_eq!(err.error_code(), "TENANT_MISMATCH");
    }
}
