//! Audit trail, emitted as `tracing` events under the `audit` target.
//!
//! Every tenant event carries the session kind and, for impersonated
//! sessions, the super admin behind it.

use tracing::info;
use uuid::Uuid;

use crate::auth::{SessionKind, TenantContext};

#[derive(Debug, Clone, Copy)]
pub struct Audit {
    enabled: bool,
}

impl Audit {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Action by a tenant principal on its own tenant's data.
    pub fn tenant(&self, ctx: &TenantContext, action: &'static str, resource: Option<Uuid>) {
        if !self.enabled {
            return;
        }
        info!(
            target: "audit",
            action,
            tenant_id = %ctx.tenant_id(),
            user_id = %ctx.user_id,
            role = ctx.role.as_str(),
            session = ctx.session.as_str(),
            actor = ?ctx.actor,
            resource = ?resource,
            "tenant action"
        );
    }

    /// Session-establishing events (login, invite acceptance, impersonation start).
    pub fn session(
        &self,
        action: &'static str,
        tenant_id: Uuid,
        user_id: Uuid,
        session: SessionKind,
        actor: Option<Uuid>,
    ) {
        if !self.enabled {
            return;
        }
        info!(
            target: "audit",
            action,
            tenant_id = %tenant_id,
            user_id = %user_id,
            session = session.as_str(),
            actor = ?actor,
            "session established"
        );
    }

    /// Action by a super admin on the platform plane.
    pub fn platform(&self, admin_id: Uuid, action: &'static str, tenant_id: Option<Uuid>) {
        if !self.enabled {
            return;
        }
        info!(
            target: "audit",
            action,
            admin_id = %admin_id,
            tenant_id = ?tenant_id,
            "platform action"
        );
    }
}
