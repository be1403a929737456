use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::audit::Audit;
use super::validation::FieldErrors;
use crate::auth::{CredentialService, TenantContext, MIN_PASSWORD_LENGTH};
use crate::database::models::{NewUser, Role, User, UserStatus};
use crate::database::Store;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserInput {
    pub tenant_id: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
}

/// Optional body of `POST /users/:id/activate`. Required for invited users,
/// who have no password yet.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateUserInput {
    pub password: Option<String>,
}

fn check_password(errors: &mut FieldErrors, password: &str) {
    if password.len() < MIN_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("Must be at least {} characters", MIN_PASSWORD_LENGTH),
        );
    }
}

/// Tenant user management. Callers are already past the owner gate.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    credentials: Arc<CredentialService>,
    audit: Audit,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, credentials: Arc<CredentialService>, audit: Audit) -> Self {
        Self { store, credentials, audit }
    }

    pub async fn list(&self, ctx: &TenantContext) -> Result<Vec<User>, ApiError> {
        Ok(self.store.list_users(&ctx.scope).await?)
    }

    pub async fn create(&self, ctx: &TenantContext, input: NewUserInput) -> Result<User, ApiError> {
        ctx.ensure_role(&[Role::Owner])?;
        ctx.confirm_tenant(input.tenant_id)?;

        let mut errors = FieldErrors::new();
        let name = errors.required_text("name", input.name.as_deref());
        let email = errors.email("email", input.email.as_deref());
        let role = input.role.unwrap_or(Role::Staff);
        if role == Role::Owner {
            errors.add("role", "Must be manager or staff");
        }
        if let Some(password) = &input.password {
            check_password(&mut errors, password);
        }
        errors.finish()?;
        let (Some(name), Some(email)) = (name, email) else {
            return Err(ApiError::validation("Validation failed", None));
        };

        let tenant = self
            .store
            .find_tenant(ctx.tenant_id())
            .await?
            .ok_or_else(|| ApiError::not_found("Tenant not found"))?;
        let current = self.store.count_users(&ctx.scope).await?;
        if !tenant.quota.allows_users(current) {
            return Err(ApiError::quota_exceeded("User quota exceeded"));
        }
        if self.store.find_user_by_email(&ctx.scope, &email).await?.is_some() {
            return Err(ApiError::Duplicate("A user with this email already exists".into()));
        }

        let new_user = match input.password {
            Some(password) => {
                let hash = self.credentials.hash_password(&password)?;
                NewUser::active(name, email, role, hash)
            }
            None => NewUser::invited(name, email, role),
        };
        let user = self.store.create_user(&ctx.scope, new_user).await?;

        info!("Created {} user {} in tenant {}", user.role, user.id, user.tenant_id);
        self.audit.tenant(ctx, "user.create", Some(user.id));
        Ok(user)
    }

    pub async fn suspend(&self, ctx: &TenantContext, id: Uuid) -> Result<User, ApiError> {
        ctx.ensure_role(&[Role::Owner])?;
        if id == ctx.user_id {
            return Err(ApiError::bad_request("You cannot suspend your own account"));
        }
        let target = self.find(ctx, id).await?;
        if target.role == Role::Owner {
            return Err(ApiError::forbidden("Insufficient permissions"));
        }

        let user = self
            .store
            .set_user_status(&ctx.scope, id, UserStatus::Suspended)
            .await?;
        self.audit.tenant(ctx, "user.suspend", Some(id));
        Ok(user)
    }

    /// Activate a suspended or invited user. A supplied password replaces
    /// the current one; invited users must be given one.
    pub async fn activate(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: ActivateUserInput,
    ) -> Result<User, ApiError> {
        ctx.ensure_role(&[Role::Owner])?;
        let target = self.find(ctx, id).await?;

        let user = match input.password {
            Some(password) => {
                let mut errors = FieldErrors::new();
                check_password(&mut errors, &password);
                errors.finish()?;
                let hash = self.credentials.hash_password(&password)?;
                self.store.set_user_password(&ctx.scope, id, hash).await?
            }
            None if target.password_hash.is_none() => {
                return Err(ApiError::field(
                    "password",
                    "Required to activate a user who has no password yet",
                ));
            }
            None => {
                self.store
                    .set_user_status(&ctx.scope, id, UserStatus::Active)
                    .await?
            }
        };
        self.audit.tenant(ctx, "user.activate", Some(id));
        Ok(user)
    }

    async fn find(&self, ctx: &TenantContext, id: Uuid) -> Result<User, ApiError> {
        self.store
            .find_user(&ctx.scope, id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }
}
