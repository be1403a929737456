use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::audit::Audit;
use super::validation::FieldErrors;
use crate::auth::{
    hash_invite_token, CredentialService, IssuedToken, PlatformContext, SessionKind,
    TenantContext, MIN_PASSWORD_LENGTH,
};
use crate::database::models::{normalize_email, NewSuperAdmin, SuperAdmin, Tenant, TenantStatus, User, UserStatus};
use crate::database::{Store, StoreError, TenantScope};
use crate::error::{ApiError, LoginFailure};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInviteRequest {
    #[serde(default)]
    pub invite_token: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Successful tenant login or invite acceptance.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSession {
    #[serde(flatten)]
    pub token: IssuedToken,
    pub user: User,
    pub tenant: Tenant,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSession {
    #[serde(flatten)]
    pub token: IssuedToken,
    pub admin: SuperAdmin,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Me {
    pub user: User,
    pub tenant: Tenant,
    pub session: SessionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<Uuid>,
}

fn check_password_length(errors: &mut FieldErrors, password: &str) {
    if password.is_empty() {
        errors.add("password", "This field is required");
    } else if password.len() < MIN_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("Must be at least {} characters", MIN_PASSWORD_LENGTH),
        );
    }
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    credentials: Arc<CredentialService>,
    audit: Audit,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, credentials: Arc<CredentialService>, audit: Audit) -> Self {
        Self { store, credentials, audit }
    }

    /// Tenant login. Failures name the offending input: slug, then email,
    /// then password, then account state.
    pub async fn login(&self, request: LoginRequest) -> Result<TenantSession, ApiError> {
        let mut errors = FieldErrors::new();
        let slug = errors.required_text("slug", Some(&request.slug));
        let email = errors.required_text("email", Some(&request.email));
        if request.password.is_empty() {
            errors.add("password", "This field is required");
        }
        errors.finish()?;
        let (Some(slug), Some(email)) = (slug, email) else {
            return Err(ApiError::validation("Validation failed", None));
        };

        let tenant = self
            .store
            .find_tenant_by_slug(&slug.to_lowercase())
            .await?
            .ok_or(ApiError::Login(LoginFailure::CompanyNotFound))?;
        let scope = TenantScope::of_tenant(&tenant);

        let user = self
            .store
            .find_user_by_email(&scope, &normalize_email(&email))
            .await?
            .ok_or(ApiError::Login(LoginFailure::UserNotFound))?;

        let matched = user
            .password_hash
            .as_deref()
            .map_or(false, |hash| self.credentials.verify_password(&request.password, hash));
        if !matched {
            warn!("Failed login for user {} in tenant {}", user.id, tenant.id);
            return Err(ApiError::Login(LoginFailure::InvalidPassword));
        }

        if user.status != UserStatus::Active || tenant.status == TenantStatus::Suspended {
            warn!("Login refused for inactive user {} in tenant {}", user.id, tenant.id);
            return Err(ApiError::Login(LoginFailure::AccountSuspended));
        }

        let token = self.credentials.issue_tenant_token(&user)?;
        self.audit
            .session("login", tenant.id, user.id, SessionKind::Standard, None);
        Ok(TenantSession { token, user, tenant })
    }

    /// Consume an invite, set the owner password and log the owner in.
    pub async fn accept_invite(
        &self,
        request: AcceptInviteRequest,
    ) -> Result<TenantSession, ApiError> {
        let mut errors = FieldErrors::new();
        let raw_token = errors.required_text("inviteToken", Some(&request.invite_token));
        check_password_length(&mut errors, &request.password);
        errors.finish()?;
        let Some(raw_token) = raw_token else {
            return Err(ApiError::InvalidInvite);
        };

        let password_hash = self.credentials.hash_password(&request.password)?;
        let (tenant, user) = match self
            .store
            .accept_invite(&hash_invite_token(&raw_token), password_hash, Utc::now())
            .await
        {
            Ok(accepted) => accepted,
            Err(StoreError::NotFound { .. }) => return Err(ApiError::InvalidInvite),
            Err(e) => return Err(e.into()),
        };

        info!("Invite accepted for tenant {} ({})", tenant.slug, tenant.id);
        let token = self.credentials.issue_tenant_token(&user)?;
        self.audit
            .session("invite.accept", tenant.id, user.id, SessionKind::Standard, None);
        Ok(TenantSession { token, user, tenant })
    }

    pub async fn me(&self, ctx: &TenantContext) -> Result<Me, ApiError> {
        let user = self
            .store
            .find_user(&ctx.scope, ctx.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        let tenant = self
            .store
            .find_tenant(ctx.tenant_id())
            .await?
            .ok_or_else(|| ApiError::not_found("Tenant not found"))?;
        Ok(Me {
            user,
            tenant,
            session: ctx.session,
            actor: ctx.actor,
        })
    }

    /// Super-admin login. Every failure looks the same to the caller.
    pub async fn admin_login(&self, request: AdminLoginRequest) -> Result<PlatformSession, ApiError> {
        let invalid = || ApiError::unauthorized("Invalid credentials");

        let admin = self
            .store
            .find_super_admin_by_email(&normalize_email(&request.email))
            .await?
            .ok_or_else(invalid)?;
        if !self.credentials.verify_password(&request.password, &admin.password_hash) {
            warn!("Failed super admin login for {}", admin.id);
            return Err(invalid());
        }

        let token = self.credentials.issue_platform_token(&admin)?;
        self.audit.platform(admin.id, "admin.login", None);
        Ok(PlatformSession { token, admin })
    }

    pub async fn admin_me(&self, ctx: &PlatformContext) -> Result<SuperAdmin, ApiError> {
        self.store
            .find_super_admin(ctx.admin_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Invalid token"))
    }

    pub async fn create_super_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SuperAdmin, ApiError> {
        let mut errors = FieldErrors::new();
        let name = errors.required_text("name", Some(name));
        let email = errors.email("email", Some(email));
        check_password_length(&mut errors, password);
        errors.finish()?;
        let (Some(name), Some(email)) = (name, email) else {
            return Err(ApiError::validation("Validation failed", None));
        };

        let password_hash = self.credentials.hash_password(password)?;
        let admin = self
            .store
            .create_super_admin(NewSuperAdmin {
                id: Uuid::new_v4(),
                name,
                email,
                password_hash,
            })
            .await?;
        info!("Created super admin {} ({})", admin.email, admin.id);
        Ok(admin)
    }

    /// Create the configured super admin unless that email is already taken.
    pub async fn bootstrap_super_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<SuperAdmin>, ApiError> {
        if self
            .store
            .find_super_admin_by_email(&normalize_email(email))
            .await?
            .is_some()
        {
            return Ok(None);
        }
        self.create_super_admin("Super Admin", email, password)
            .await
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::generate_invite_token;
    use crate::config::JwtSecret;
    use crate::database::models::{NewTenant, NewUser, Role};
    use crate::database::MemoryStore;

    fn service(store: Arc<dyn Store>) -> AuthService {
        let secret = JwtSecret::new("auth-service-test-secret").unwrap();
        let credentials = Arc::new(CredentialService::new(&secret, chrono::Duration::hours(1), 4));
        AuthService::new(store, credentials, Audit::disabled())
    }

    async fn provisioned(store: &Arc<dyn Store>, raw_token: &str) -> Tenant {
        let owner = NewUser::invited("Olive Owner", "olive@acme.test", Role::Owner);
        let tenant = NewTenant {
            id: Uuid::new_v4(),
            name: "Acme".into(),
            slug: "acme".into(),
            owner_email: owner.email.clone(),
            invite_token_hash: hash_invite_token(raw_token),
            invite_expires_at: Utc::now() + chrono::Duration::days(1),
            contact: Default::default(),
            business: Default::default(),
            quota: Default::default(),
        };
        store.provision_tenant(tenant, owner).await.unwrap().0
    }

    #[tokio::test]
    async fn invite_is_single_use() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let auth = service(store.clone());
        let raw = generate_invite_token();
        provisioned(&store, &raw).await;

        let request = || AcceptInviteRequest {
            invite_token: raw.clone(),
            password: "correct-horse".into(),
        };
        let session = auth.accept_invite(request()).await.unwrap();
        assert_eq!(session.tenant.status, TenantStatus::Active);
        assert_eq!(session.user.status, UserStatus::Active);

        let err = auth.accept_invite(request()).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INVITE");
    }

    #[tokio::test]
    async fn login_reports_the_failing_field() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let auth = service(store.clone());
        let raw = generate_invite_token();
        provisioned(&store, &raw).await;
        auth.accept_invite(AcceptInviteRequest {
            invite_token: raw,
            password: "correct-horse".into(),
        })
        .await
        .unwrap();

        let attempt = |slug: &str, email: &str, password: &str| LoginRequest {
            slug: slug.into(),
            email: email.into(),
            password: password.into(),
        };

        let err = auth.login(attempt("nope", "olive@acme.test", "correct-horse")).await.unwrap_err();
        assert_eq!(err.error_code(), "COMPANY_NOT_FOUND");
        let err = auth.login(attempt("acme", "nobody@acme.test", "correct-horse")).await.unwrap_err();
        assert_eq!(err.error_code(), "USER_NOT_FOUND");
        let err = auth.login(attempt("acme", "olive@acme.test", "wrong-horse")).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PASSWORD");

        let session = auth.login(attempt("ACME", "Olive@Acme.test", "correct-horse")).await.unwrap();
        assert_eq!(session.user.role, Role::Owner);
    }

    #[tokio::test]
    async fn admin_login_is_generic() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let auth = service(store);
        auth.create_super_admin("Root", "root@platform.test", "platform-pass")
            .await
            .unwrap();

        let unknown = auth
            .admin_login(AdminLoginRequest { email: "who@platform.test".into(), password: "platform-pass".into() })
            .await
            .unwrap_err();
        let wrong = auth
            .admin_login(AdminLoginRequest { email: "root@platform.test".into(), password: "nope-nope".into() })
            .await
            .unwrap_err();
        assert_eq!(unknown.message(), wrong.message());
        assert_eq!(unknown.status_code(), 401);

        assert!(auth.bootstrap_super_admin("root@platform.test", "whatever1").await.unwrap().is_none());
    }
}
