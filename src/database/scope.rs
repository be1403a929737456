use uuid::Uuid;

use crate::auth::{PlatformClaims, TenantClaims};
use crate::database::models::Tenant;

/// Proof that a tenant identity was resolved by the server, never copied
/// from client input. Every tenant-owned store operation takes one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantScope {
    tenant_id: Uuid,
}

impl TenantScope {
    /// Scope carried by a verified tenant session.
    pub fn from_claims(claims: &TenantClaims) -> Self {
        Self { tenant_id: claims.tenant_id }
    }

    /// Scope chosen explicitly by a verified platform operator.
    pub fn for_platform(_claims: &PlatformClaims, tenant_id: Uuid) -> Self {
        Self { tenant_id }
    }

    /// Scope of a tenant record the server itself just loaded (login, invite acceptance).
    pub(crate) fn of_tenant(tenant: &Tenant) -> Self {
        Self { tenant_id: tenant.id }
    }

    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    /// Double-submit check: a tenant id supplied by the client is only
    /// accepted when it names this scope.
    pub fn confirms(&self, supplied: Option<Uuid>) -> bool {
        supplied.map_or(true, |id| id == self.tenant_id)
    }
}

#[cfg(test)]
impl TenantScope {
    pub(crate) fn for_test(tenant_id: Uuid) -> Self {
        Self { tenant_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirms_only_matching_tenant() {
        let scope = TenantScope::for_test(Uuid::new_v4());
        assert!(scope.confirms(None));
        assert!(scope.confirms(Some(scope.tenant_id())));
        assert!(!scope.confirms(Some(Uuid::new_v4())));
    }
}
