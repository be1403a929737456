use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{
    Category, CategoryPatch, NewCategory, NewProduct, NewSuperAdmin, NewTenant, NewUser, Product,
    ProductFilter, ProductPatch, SuperAdmin, Tenant, TenantQuota, TenantStatus, User, UserStatus,
};
use crate::database::scope::TenantScope;

/// Outcome taxonomy of every store operation. Drivers translate their own
/// error shapes into this before anything above the store sees them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation failed")]
    Validation { fields: BTreeMap<String, String> },

    /// A unique index rejected the write. `key` names the index, e.g. `products.sku`.
    #[error("duplicate value for {key}")]
    Conflict { key: &'static str },

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str) -> Self {
        StoreError::NotFound { entity }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), message.into());
        StoreError::Validation { fields }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Unique index names, shared by both store implementations.
pub mod keys {
    pub const TENANT_SLUG: &str = "tenants.slug";
    pub const TENANT_INVITE: &str = "tenants.invite_token_hash";
    pub const USER_EMAIL: &str = "users.tenant_email";
    pub const SUPER_ADMIN_EMAIL: &str = "super_admins.email";
    pub const CATEGORY_NAME: &str = "categories.tenant_name";
    pub const PRODUCT_SKU: &str = "products.tenant_sku";
    pub const CATEGORY_IN_USE: &str = "products.category";
    pub const INVITE_ACCEPTED: &str = "tenants.invite_accepted";
}

/// Persistence boundary. Tenant-owned data is only reachable through a
/// `TenantScope`; every lookup, update and delete filters on it.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    // Tenant directory (platform-level)

    /// Insert tenant and owner together. The owner is created inside the
    /// new tenant, so `tenant.owner_user_id == owner.id` holds by construction.
    async fn provision_tenant(&self, tenant: NewTenant, owner: NewUser) -> StoreResult<(Tenant, User)>;
    async fn find_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>>;
    async fn find_tenant_by_slug(&self, slug: &str) -> StoreResult<Option<Tenant>>;
    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>>;
    async fn set_tenant_status(&self, id: Uuid, status: TenantStatus) -> StoreResult<Tenant>;
    async fn set_tenant_quota(&self, id: Uuid, quota: TenantQuota) -> StoreResult<Tenant>;
    /// Replace the invite token of a tenant whose invite is still pending.
    async fn reissue_invite(
        &self,
        id: Uuid,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<Tenant>;
    /// Consume an invite atomically: set the owner password, activate owner
    /// and tenant, clear the token. Fails with `NotFound` when the token is
    /// unknown, already used or expired at `now`.
    async fn accept_invite(
        &self,
        token_hash: &str,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> StoreResult<(Tenant, User)>;

    // Super admins

    async fn create_super_admin(&self, admin: NewSuperAdmin) -> StoreResult<SuperAdmin>;
    async fn find_super_admin(&self, id: Uuid) -> StoreResult<Option<SuperAdmin>>;
    async fn find_super_admin_by_email(&self, email: &str) -> StoreResult<Option<SuperAdmin>>;
    async fn count_super_admins(&self) -> StoreResult<i64>;

    // Users

    async fn create_user(&self, scope: &TenantScope, user: NewUser) -> StoreResult<User>;
    async fn find_user(&self, scope: &TenantScope, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, scope: &TenantScope, email: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self, scope: &TenantScope) -> StoreResult<Vec<User>>;
    async fn count_users(&self, scope: &TenantScope) -> StoreResult<i64>;
    async fn set_user_status(&self, scope: &TenantScope, id: Uuid, status: UserStatus) -> StoreResult<User>;
    /// Store the password hash and mark the user active.
    async fn set_user_password(&self, scope: &TenantScope, id: Uuid, password_hash: String) -> StoreResult<User>;

    // Categories

    async fn create_category(&self, scope: &TenantScope, category: NewCategory) -> StoreResult<Category>;
    async fn find_category(&self, scope: &TenantScope, id: Uuid) -> StoreResult<Option<Category>>;
    async fn list_categories(&self, scope: &TenantScope) -> StoreResult<Vec<Category>>;
    async fn update_category(&self, scope: &TenantScope, id: Uuid, patch: CategoryPatch) -> StoreResult<Category>;
    async fn delete_category(&self, scope: &TenantScope, id: Uuid) -> StoreResult<()>;

    // Products

    async fn create_product(&self, scope: &TenantScope, product: NewProduct) -> StoreResult<Product>;
    async fn find_product(&self, scope: &TenantScope, id: Uuid) -> StoreResult<Option<Product>>;
    async fn find_product_by_sku(&self, scope: &TenantScope, sku: &str) -> StoreResult<Option<Product>>;
    async fn list_products(&self, scope: &TenantScope, filter: &ProductFilter) -> StoreResult<Vec<Product>>;
    async fn count_products(&self, scope: &TenantScope) -> StoreResult<i64>;
    async fn update_product(&self, scope: &TenantScope, id: Uuid, patch: ProductPatch) -> StoreResult<Product>;
    async fn delete_product(&self, scope: &TenantScope, id: Uuid) -> StoreResult<()>;
}
