use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::audit::Audit;
use super::validation::FieldErrors;
use crate::auth::{
    generate_invite_token, hash_invite_token, CredentialService, IssuedToken, PlatformContext,
    SessionKind,
};
use crate::config::SecurityConfig;
use crate::database::models::{
    BusinessProfile, Category, NewTenant, NewUser, Product, ProductFilter, Role, Tenant,
    TenantContact, TenantQuota, TenantStatus, User, UserStatus,
};
use crate::database::Store;
use crate::error::ApiError;

const DEFAULT_IMPERSONATION_MINUTES: u32 = 30;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionTenantRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    #[serde(default)]
    pub contact: TenantContact,
    #[serde(default)]
    pub business: BusinessProfile,
    #[serde(default)]
    pub quota: TenantQuota,
}

/// Returned once, at provisioning or reissue. The raw invite token is not
/// recoverable afterwards.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantInvite {
    pub tenant: Tenant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
    pub invite_token: String,
    pub invite_expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpersonateRequest {
    pub user_id: Uuid,
    pub duration_minutes: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpersonationSession {
    #[serde(flatten)]
    pub token: IssuedToken,
    pub user: User,
    pub session: SessionKind,
    pub duration_minutes: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantExport {
    pub tenant: Tenant,
    pub users: Vec<User>,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub exported_at: DateTime<Utc>,
}

/// Lowercase `[a-z0-9-]`, 2 to 63 characters, no hyphen at either end.
pub fn normalize_slug(raw: &str) -> Result<String, &'static str> {
    let slug = raw.trim().to_lowercase();
    if slug.len() < 2 || slug.len() > 63 {
        return Err("Must be between 2 and 63 characters");
    }
    if !slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err("Only lowercase letters, digits and hyphens are allowed");
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err("Must not start or end with a hyphen");
    }
    Ok(slug)
}

fn check_quota(errors: &mut FieldErrors, quota: &TenantQuota) {
    if quota.max_users.map_or(false, |n| n < 1) {
        errors.add("quota.maxUsers", "Must be at least 1");
    }
    if quota.max_products.map_or(false, |n| n < 0) {
        errors.add("quota.maxProducts", "Must be zero or greater");
    }
}

/// Tenant lifecycle on the super-admin plane.
#[derive(Clone)]
pub struct TenantService {
    store: Arc<dyn Store>,
    credentials: Arc<CredentialService>,
    audit: Audit,
    invite_ttl: Duration,
    max_impersonation_minutes: u32,
}

impl TenantService {
    pub fn new(
        store: Arc<dyn Store>,
        credentials: Arc<CredentialService>,
        audit: Audit,
        security: &SecurityConfig,
    ) -> Self {
        Self {
            store,
            credentials,
            audit,
            invite_ttl: Duration::hours(security.invite_ttl_hours as i64),
            max_impersonation_minutes: security.max_impersonation_minutes,
        }
    }

    /// Create a tenant in `trial` with an invited owner and a fresh invite.
    pub async fn provision(
        &self,
        ctx: &PlatformContext,
        request: ProvisionTenantRequest,
    ) -> Result<TenantInvite, ApiError> {
        let mut errors = FieldErrors::new();
        let name = errors.required_text("name", request.name.as_deref());
        let slug = match request.slug.as_deref().map(normalize_slug) {
            None => {
                errors.add("slug", "This field is required");
                None
            }
            Some(Err(reason)) => {
                errors.add("slug", reason);
                None
            }
            Some(Ok(slug)) => Some(slug),
        };
        let owner_name = errors.required_text("ownerName", request.owner_name.as_deref());
        let owner_email = errors.email("ownerEmail", request.owner_email.as_deref());
        check_quota(&mut errors, &request.quota);
        errors.finish()?;
        let (Some(name), Some(slug), Some(owner_name), Some(owner_email)) =
            (name, slug, owner_name, owner_email)
        else {
            return Err(ApiError::validation("Validation failed", None));
        };

        if self.store.find_tenant_by_slug(&slug).await?.is_some() {
            return Err(ApiError::Duplicate("A tenant with this slug already exists".into()));
        }

        let invite_token = generate_invite_token();
        let invite_expires_at = Utc::now() + self.invite_ttl;
        let owner = NewUser::invited(owner_name, owner_email, Role::Owner);
        let tenant = NewTenant {
            id: Uuid::new_v4(),
            name,
            slug,
            owner_email: owner.email.clone(),
            invite_token_hash: hash_invite_token(&invite_token),
            invite_expires_at,
            contact: request.contact,
            business: request.business,
            quota: request.quota,
        };

        let (tenant, owner) = self.store.provision_tenant(tenant, owner).await?;
        info!("Provisioned tenant {} ({})", tenant.slug, tenant.id);
        self.audit.platform(ctx.admin_id, "tenant.provision", Some(tenant.id));

        Ok(TenantInvite {
            tenant,
            owner: Some(owner),
            invite_token,
            invite_expires_at,
        })
    }

    pub async fn list(&self) -> Result<Vec<Tenant>, ApiError> {
        Ok(self.store.list_tenants().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Tenant, ApiError> {
        self.store
            .find_tenant(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Tenant not found"))
    }

    pub async fn suspend(&self, ctx: &PlatformContext, id: Uuid) -> Result<Tenant, ApiError> {
        let tenant = self.store.set_tenant_status(id, TenantStatus::Suspended).await?;
        info!("Suspended tenant {} ({})", tenant.slug, tenant.id);
        self.audit.platform(ctx.admin_id, "tenant.suspend", Some(id));
        Ok(tenant)
    }

    pub async fn activate(&self, ctx: &PlatformContext, id: Uuid) -> Result<Tenant, ApiError> {
        let tenant = self.store.set_tenant_status(id, TenantStatus::Active).await?;
        info!("Activated tenant {} ({})", tenant.slug, tenant.id);
        self.audit.platform(ctx.admin_id, "tenant.activate", Some(id));
        Ok(tenant)
    }

    pub async fn set_quota(
        &self,
        ctx: &PlatformContext,
        id: Uuid,
        quota: TenantQuota,
    ) -> Result<Tenant, ApiError> {
        let mut errors = FieldErrors::new();
        check_quota(&mut errors, &quota);
        errors.finish()?;

        let tenant = self.store.set_tenant_quota(id, quota).await?;
        self.audit.platform(ctx.admin_id, "tenant.quota", Some(id));
        Ok(tenant)
    }

    /// Replace a pending invite. Refused once the invite was accepted.
    pub async fn reissue_invite(&self, ctx: &PlatformContext, id: Uuid) -> Result<TenantInvite, ApiError> {
        let invite_token = generate_invite_token();
        let invite_expires_at = Utc::now() + self.invite_ttl;
        let tenant = self
            .store
            .reissue_invite(id, hash_invite_token(&invite_token), invite_expires_at)
            .await?;

        self.audit.platform(ctx.admin_id, "tenant.invite", Some(id));
        Ok(TenantInvite {
            tenant,
            owner: None,
            invite_token,
            invite_expires_at,
        })
    }

    /// Time-boxed tenant session acting as `user_id`, attributed to the admin.
    pub async fn impersonate(
        &self,
        ctx: &PlatformContext,
        tenant_id: Uuid,
        request: ImpersonateRequest,
    ) -> Result<ImpersonationSession, ApiError> {
        let max = self.max_impersonation_minutes;
        let minutes = request
            .duration_minutes
            .unwrap_or_else(|| DEFAULT_IMPERSONATION_MINUTES.min(max));
        if minutes < 1 || minutes > max {
            return Err(ApiError::field(
                "durationMinutes",
                format!("Must be between 1 and {}", max),
            ));
        }

        let tenant = self.get(tenant_id).await?;
        if tenant.status == TenantStatus::Suspended {
            return Err(ApiError::conflict("Tenant is suspended"));
        }

        let scope = ctx.scope_for(tenant.id);
        let user = self
            .store
            .find_user(&scope, request.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        if user.status != UserStatus::Active {
            return Err(ApiError::field("userId", "User is not active"));
        }

        let token = self.credentials.issue_impersonation_token(
            &user,
            ctx.admin_id,
            Duration::minutes(minutes as i64),
        )?;
        info!(
            "Super admin {} impersonating user {} in tenant {} for {} minutes",
            ctx.admin_id, user.id, tenant.id, minutes
        );
        self.audit.session(
            "impersonation.start",
            tenant.id,
            user.id,
            SessionKind::Impersonation,
            Some(ctx.admin_id),
        );

        Ok(ImpersonationSession {
            token,
            user,
            session: SessionKind::Impersonation,
            duration_minutes: minutes,
        })
    }

    /// Everything a tenant owns, minus credentials.
    pub async fn export(&self, ctx: &PlatformContext, tenant_id: Uuid) -> Result<TenantExport, ApiError> {
        let tenant = self.get(tenant_id).await?;
        let scope = ctx.scope_for(tenant.id);

        let users = self.store.list_users(&scope).await?;
        let categories = self.store.list_categories(&scope).await?;
        let products = self
            .store
            .list_products(&scope, &ProductFilter::default())
            .await?;

        self.audit.platform(ctx.admin_id, "tenant.export", Some(tenant_id));
        Ok(TenantExport {
            tenant,
            users,
            categories,
            products,
            exported_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_normalized() {
        assert_eq!(normalize_slug("  Acme-Corp ").unwrap(), "acme-corp");
        assert_eq!(normalize_slug("a1").unwrap(), "a1");
    }

    #[test]
    fn bad_slugs_are_rejected() {
        assert!(normalize_slug("a").is_err());
        assert!(normalize_slug("-acme").is_err());
        assert!(normalize_slug("acme-").is_err());
        assert!(normalize_slug("acme corp").is_err());
        assert!(normalize_slug("acme_corp").is_err());
        assert!(normalize_slug(&"a".repeat(64)).is_err());
        assert!(normalize_slug(&"a".repeat(63)).is_ok());
    }

    #[test]
    fn quota_must_be_sensible() {
        let mut errors = FieldErrors::new();
        check_quota(&mut errors, &TenantQuota { max_users: Some(0), max_products: Some(-1) });
        let body = errors.finish().unwrap_err().to_json();
        assert!(body["fields"]["quota.maxUsers"].is_string());
        assert!(body["fields"]["quota.maxProducts"].is_string());
    }
}
