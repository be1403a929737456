use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::database::models::{
    BusinessProfile, Category, CategoryPatch, NewCategory, NewProduct, NewSuperAdmin, NewTenant,
    NewUser, Product, ProductFilter, ProductPatch, SuperAdmin, Tenant, TenantContact, TenantQuota,
    TenantStatus, UnknownVariant, User, UserStatus,
};
use crate::database::query::ScopedQuery;
use crate::database::scope::TenantScope;
use crate::database::store::{keys, Store, StoreError, StoreResult};

const TENANT_COLUMNS: &str = "id, name, slug, status, owner_user_id, owner_email, invite_token_hash, \
     invite_accepted, invite_expires_at, contact, business, max_users, max_products, created_at, updated_at";

const USER_COLUMNS: &str =
    "id, tenant_id, name, email, password_hash, role, status, created_at, updated_at";

const SUPER_ADMIN_COLUMNS: &str = "id, name, email, password_hash, created_at";

const CATEGORY_COLUMNS: &str = "id, tenant_id, name, description, created_at, updated_at";

const PRODUCT_COLUMNS: &str = "id, tenant_id, name, category_id, sku, cost_price, selling_price, \
     quantity, unit, reorder_level, supplier_name, status, image, created_at, updated_at";

/// Postgres-backed store. Uniqueness and same-tenant references are
/// enforced by the schema in `migrations`; this type only translates the
/// resulting violations.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| sqlx::Error::Configuration("DATABASE_URL is not set".into()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Connected database pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

enum Violation {
    Unique(String),
    ForeignKey,
    Check(String),
}

fn violation(err: &sqlx::Error) -> Option<Violation> {
    let sqlx::Error::Database(db) = err else {
        return None;
    };
    let constraint = db.constraint().unwrap_or_default().to_string();
    if db.is_unique_violation() {
        Some(Violation::Unique(constraint))
    } else if db.is_foreign_key_violation() {
        Some(Violation::ForeignKey)
    } else if db.is_check_violation() {
        Some(Violation::Check(constraint))
    } else {
        None
    }
}

fn unique_key(constraint: &str) -> Option<&'static str> {
    match constraint {
        "tenants_slug_key" => Some(keys::TENANT_SLUG),
        "tenants_invite_token_hash_key" => Some(keys::TENANT_INVITE),
        "users_tenant_email_key" => Some(keys::USER_EMAIL),
        "super_admins_email_key" => Some(keys::SUPER_ADMIN_EMAIL),
        "categories_tenant_name_key" => Some(keys::CATEGORY_NAME),
        "products_tenant_sku_key" => Some(keys::PRODUCT_SKU),
        _ => None,
    }
}

/// Translate a driver error. `missing` names the entity a foreign-key
/// violation points at for this particular statement.
fn translate(err: sqlx::Error, missing: &'static str) -> StoreError {
    match violation(&err) {
        Some(Violation::Unique(constraint)) => match unique_key(&constraint) {
            Some(key) => StoreError::Conflict { key },
            None => internal(err),
        },
        Some(Violation::ForeignKey) => StoreError::not_found(missing),
        Some(Violation::Check(constraint)) => {
            StoreError::field(check_field(&constraint), "Value is out of range")
        }
        None => internal(err),
    }
}

// Postgres names unnamed column checks `<table>_<column>_check`.
fn check_field(constraint: &str) -> &str {
    constraint
        .strip_suffix("_check")
        .and_then(|rest| rest.split_once('_').map(|(_, column)| column))
        .unwrap_or(constraint)
}

fn internal(err: sqlx::Error) -> StoreError {
    error!("Database error: {}", err);
    StoreError::Internal(err.to_string())
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        internal(err)
    }
}

impl From<UnknownVariant> for StoreError {
    fn from(err: UnknownVariant) -> Self {
        StoreError::Internal(err.to_string())
    }
}

fn tenant_from_row(row: &PgRow) -> StoreResult<Tenant> {
    let status: String = row.try_get("status")?;
    let Json(contact): Json<TenantContact> = row.try_get("contact")?;
    let Json(business): Json<BusinessProfile> = row.try_get("business")?;
    Ok(Tenant {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        status: status.parse()?,
        owner_user_id: row.try_get("owner_user_id")?,
        owner_email: row.try_get("owner_email")?,
        invite_token_hash: row.try_get("invite_token_hash")?,
        invite_accepted: row.try_get("invite_accepted")?,
        invite_expires_at: row.try_get("invite_expires_at")?,
        contact,
        business,
        quota: TenantQuota {
            max_users: row.try_get("max_users")?,
            max_products: row.try_get("max_products")?,
        },
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let role: String = row.try_get("role")?;
    let status: String = row.try_get("status")?;
    Ok(User {
        id: row.try_get("id")?,
        tenant_id: row.try_get("tenant_id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: role.parse()?,
        status: status.parse()?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn super_admin_from_row(row: &PgRow) -> StoreResult<SuperAdmin> {
    Ok(SuperAdmin {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

fn category_from_row(row: &PgRow) -> StoreResult<Category> {
    Ok(Category {
        id: row.try_get("id")?,
        tenant_id: row.try_get("tenant_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn product_from_row(row: &PgRow) -> StoreResult<Product> {
    let status: String = row.try_get("status")?;
    Ok(Product {
        id: row.try_get("id")?,
        tenant_id: row.try_get("tenant_id")?,
        name: row.try_get("name")?,
        category_id: row.try_get("category_id")?,
        sku: row.try_get("sku")?,
        cost_price: row.try_get("cost_price")?,
        selling_price: row.try_get("selling_price")?,
        quantity: row.try_get("quantity")?,
        unit: row.try_get("unit")?,
        reorder_level: row.try_get("reorder_level")?,
        supplier_name: row.try_get("supplier_name")?,
        status: status.parse()?,
        image: row.try_get("image")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn collect<T>(rows: Vec<PgRow>, map: fn(&PgRow) -> StoreResult<T>) -> StoreResult<Vec<T>> {
    rows.iter().map(map).collect()
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn provision_tenant(&self, tenant: NewTenant, owner: NewUser) -> StoreResult<(Tenant, User)> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO tenants (id, name, slug, status, owner_user_id, owner_email, invite_token_hash, \
             invite_expires_at, contact, business, max_users, max_products) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING {}",
            TENANT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(tenant.id)
            .bind(&tenant.name)
            .bind(&tenant.slug)
            .bind(TenantStatus::Trial.as_str())
            .bind(owner.id)
            .bind(&tenant.owner_email)
            .bind(&tenant.invite_token_hash)
            .bind(tenant.invite_expires_at)
            .bind(Json(&tenant.contact))
            .bind(Json(&tenant.business))
            .bind(tenant.quota.max_users)
            .bind(tenant.quota.max_products)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| translate(e, "tenant"))?;
        let created = tenant_from_row(&row)?;

        let sql = format!(
            "INSERT INTO users (id, tenant_id, name, email, password_hash, role, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(owner.id)
            .bind(created.id)
            .bind(&owner.name)
            .bind(&owner.email)
            .bind(&owner.password_hash)
            .bind(owner.role.as_str())
            .bind(owner.status.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| translate(e, "tenant"))?;
        let owner = user_from_row(&row)?;

        // The deferred owner reference is checked here.
        tx.commit().await.map_err(|e| translate(e, "user"))?;
        Ok((created, owner))
    }

    async fn find_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>> {
        let sql = format!("SELECT {} FROM tenants WHERE id = $1", TENANT_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(tenant_from_row).transpose()
    }

    async fn find_tenant_by_slug(&self, slug: &str) -> StoreResult<Option<Tenant>> {
        let sql = format!("SELECT {} FROM tenants WHERE slug = $1", TENANT_COLUMNS);
        let row = sqlx::query(&sql).bind(slug).fetch_optional(&self.pool).await?;
        row.as_ref().map(tenant_from_row).transpose()
    }

    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>> {
        let sql = format!("SELECT {} FROM tenants ORDER BY created_at DESC", TENANT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        collect(rows, tenant_from_row)
    }

    async fn set_tenant_status(&self, id: Uuid, status: TenantStatus) -> StoreResult<Tenant> {
        let sql = format!(
            "UPDATE tenants SET status = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            TENANT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::not_found("tenant"))?;
        tenant_from_row(&row)
    }

    async fn set_tenant_quota(&self, id: Uuid, quota: TenantQuota) -> StoreResult<Tenant> {
        let sql = format!(
            "UPDATE tenants SET max_users = $2, max_products = $3, updated_at = now() \
             WHERE id = $1 RETURNING {}",
            TENANT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(quota.max_users)
            .bind(quota.max_products)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| translate(e, "tenant"))?
            .ok_or(StoreError::not_found("tenant"))?;
        tenant_from_row(&row)
    }

    async fn reissue_invite(
        &self,
        id: Uuid,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<Tenant> {
        let mut tx = self.pool.begin().await?;

        let accepted: Option<bool> =
            sqlx::query_scalar("SELECT invite_accepted FROM tenants WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        match accepted {
            None => return Err(StoreError::not_found("tenant")),
            Some(true) => return Err(StoreError::Conflict { key: keys::INVITE_ACCEPTED }),
            Some(false) => {}
        }

        let sql = format!(
            "UPDATE tenants SET invite_token_hash = $2, invite_expires_at = $3, updated_at = now() \
             WHERE id = $1 RETURNING {}",
            TENANT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(&token_hash)
            .bind(expires_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| translate(e, "tenant"))?;
        let tenant = tenant_from_row(&row)?;

        tx.commit().await?;
        Ok(tenant)
    }

    async fn accept_invite(
        &self,
        token_hash: &str,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> StoreResult<(Tenant, User)> {
        let mut tx = self.pool.begin().await?;

        // The row lock taken by the conditional update serializes concurrent
        // acceptances; the loser re-evaluates the predicate and matches nothing.
        let sql = format!(
            "UPDATE tenants SET invite_token_hash = NULL, invite_accepted = TRUE, \
             invite_expires_at = NULL, \
             status = CASE WHEN status = 'trial' THEN 'active' ELSE status END, \
             updated_at = $2 \
             WHERE invite_token_hash = $1 AND invite_accepted = FALSE \
             AND (invite_expires_at IS NULL OR invite_expires_at > $2) \
             RETURNING {}",
            TENANT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(token_hash)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::not_found("invite"))?;
        let tenant = tenant_from_row(&row)?;

        let sql = format!(
            "UPDATE users SET password_hash = $3, status = $4, updated_at = $5 \
             WHERE id = $1 AND tenant_id = $2 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(tenant.owner_user_id)
            .bind(tenant.id)
            .bind(&password_hash)
            .bind(UserStatus::Active.as_str())
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::not_found("user"))?;
        let owner = user_from_row(&row)?;

        tx.commit().await?;
        Ok((tenant, owner))
    }

    async fn create_super_admin(&self, admin: NewSuperAdmin) -> StoreResult<SuperAdmin> {
        let sql = format!(
            "INSERT INTO super_admins (id, name, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING {}",
            SUPER_ADMIN_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(admin.id)
            .bind(&admin.name)
            .bind(&admin.email)
            .bind(&admin.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| translate(e, "super admin"))?;
        super_admin_from_row(&row)
    }

    async fn find_super_admin(&self, id: Uuid) -> StoreResult<Option<SuperAdmin>> {
        let sql = format!("SELECT {} FROM super_admins WHERE id = $1", SUPER_ADMIN_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(super_admin_from_row).transpose()
    }

    async fn find_super_admin_by_email(&self, email: &str) -> StoreResult<Option<SuperAdmin>> {
        let sql = format!("SELECT {} FROM super_admins WHERE email = $1", SUPER_ADMIN_COLUMNS);
        let row = sqlx::query(&sql).bind(email).fetch_optional(&self.pool).await?;
        row.as_ref().map(super_admin_from_row).transpose()
    }

    async fn count_super_admins(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM super_admins")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create_user(&self, scope: &TenantScope, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (id, tenant_id, name, email, password_hash, role, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(user.id)
            .bind(scope.tenant_id())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| translate(e, "tenant"))?;
        user_from_row(&row)
    }

    async fn find_user(&self, scope: &TenantScope, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1 AND tenant_id = $2", USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(scope.tenant_id())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_email(&self, scope: &TenantScope, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1 AND tenant_id = $2", USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(email)
            .bind(scope.tenant_id())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self, scope: &TenantScope) -> StoreResult<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE tenant_id = $1 ORDER BY created_at DESC",
            USER_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(scope.tenant_id()).fetch_all(&self.pool).await?;
        collect(rows, user_from_row)
    }

    async fn count_users(&self, scope: &TenantScope) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE tenant_id = $1")
            .bind(scope.tenant_id())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn set_user_status(&self, scope: &TenantScope, id: Uuid, status: UserStatus) -> StoreResult<User> {
        let sql = format!(
            "UPDATE users SET status = $3, updated_at = now() WHERE id = $1 AND tenant_id = $2 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(scope.tenant_id())
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::not_found("user"))?;
        user_from_row(&row)
    }

    async fn set_user_password(&self, scope: &TenantScope, id: Uuid, password_hash: String) -> StoreResult<User> {
        let sql = format!(
            "UPDATE users SET password_hash = $3, status = $4, updated_at = now() \
             WHERE id = $1 AND tenant_id = $2 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(scope.tenant_id())
            .bind(&password_hash)
            .bind(UserStatus::Active.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::not_found("user"))?;
        user_from_row(&row)
    }

    async fn create_category(&self, scope: &TenantScope, category: NewCategory) -> StoreResult<Category> {
        let sql = format!(
            "INSERT INTO categories (id, tenant_id, name, description) VALUES ($1, $2, $3, $4) RETURNING {}",
            CATEGORY_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(category.id)
            .bind(scope.tenant_id())
            .bind(&category.name)
            .bind(&category.description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| translate(e, "tenant"))?;
        category_from_row(&row)
    }

    async fn find_category(&self, scope: &TenantScope, id: Uuid) -> StoreResult<Option<Category>> {
        let sql = format!(
            "SELECT {} FROM categories WHERE id = $1 AND tenant_id = $2",
            CATEGORY_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(scope.tenant_id())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(category_from_row).transpose()
    }

    async fn list_categories(&self, scope: &TenantScope) -> StoreResult<Vec<Category>> {
        let sql = format!(
            "SELECT {} FROM categories WHERE tenant_id = $1 ORDER BY name ASC",
            CATEGORY_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(scope.tenant_id()).fetch_all(&self.pool).await?;
        collect(rows, category_from_row)
    }

    async fn update_category(&self, scope: &TenantScope, id: Uuid, patch: CategoryPatch) -> StoreResult<Category> {
        let sql = format!(
            "UPDATE categories SET name = COALESCE($3, name), \
             description = CASE WHEN $4 THEN $5 ELSE description END, updated_at = now() \
             WHERE id = $1 AND tenant_id = $2 RETURNING {}",
            CATEGORY_COLUMNS
        );
        let (set_description, description) = match patch.description {
            Some(value) => (true, value),
            None => (false, None),
        };
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(scope.tenant_id())
            .bind(&patch.name)
            .bind(set_description)
            .bind(description)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| translate(e, "category"))?
            .ok_or(StoreError::not_found("category"))?;
        category_from_row(&row)
    }

    async fn delete_category(&self, scope: &TenantScope, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(scope.tenant_id())
            .execute(&self.pool)
            .await
            .map_err(|e| match violation(&e) {
                Some(Violation::ForeignKey) => StoreError::Conflict { key: keys::CATEGORY_IN_USE },
                _ => internal(e),
            })?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("category"));
        }
        Ok(())
    }

    async fn create_product(&self, scope: &TenantScope, product: NewProduct) -> StoreResult<Product> {
        let sql = format!(
            "INSERT INTO products (id, tenant_id, name, category_id, sku, cost_price, selling_price, \
             quantity, unit, reorder_level, supplier_name, status, image) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(product.id)
            .bind(scope.tenant_id())
            .bind(&product.name)
            .bind(product.category_id)
            .bind(&product.sku)
            .bind(product.cost_price)
            .bind(product.selling_price)
            .bind(product.quantity)
            .bind(&product.unit)
            .bind(product.reorder_level)
            .bind(&product.supplier_name)
            .bind(product.status.as_str())
            .bind(&product.image)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| translate(e, "category"))?;
        product_from_row(&row)
    }

    async fn find_product(&self, scope: &TenantScope, id: Uuid) -> StoreResult<Option<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE id = $1 AND tenant_id = $2",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(scope.tenant_id())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn find_product_by_sku(&self, scope: &TenantScope, sku: &str) -> StoreResult<Option<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE sku = $1 AND tenant_id = $2",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(sku)
            .bind(scope.tenant_id())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn list_products(&self, scope: &TenantScope, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let query = ScopedQuery::product_list(scope, filter);
        let sql = format!(
            "SELECT {} FROM products WHERE {} ORDER BY created_at DESC",
            PRODUCT_COLUMNS,
            query.where_clause()
        );
        let rows = query.bind(sqlx::query(&sql)).fetch_all(&self.pool).await?;
        collect(rows, product_from_row)
    }

    async fn count_products(&self, scope: &TenantScope) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE tenant_id = $1")
            .bind(scope.tenant_id())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn update_product(&self, scope: &TenantScope, id: Uuid, patch: ProductPatch) -> StoreResult<Product> {
        let sql = format!(
            "UPDATE products SET \
             name = COALESCE($3, name), \
             category_id = COALESCE($4, category_id), \
             sku = COALESCE($5, sku), \
             cost_price = COALESCE($6, cost_price), \
             selling_price = COALESCE($7, selling_price), \
             quantity = COALESCE($8, quantity), \
             unit = COALESCE($9, unit), \
             reorder_level = COALESCE($10, reorder_level), \
             supplier_name = COALESCE($11, supplier_name), \
             status = COALESCE($12, status), \
             image = CASE WHEN $13 THEN $14 ELSE image END, \
             updated_at = now() \
             WHERE id = $1 AND tenant_id = $2 RETURNING {}",
            PRODUCT_COLUMNS
        );
        let (set_image, image) = match patch.image {
            Some(value) => (true, value),
            None => (false, None),
        };
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(scope.tenant_id())
            .bind(&patch.name)
            .bind(patch.category_id)
            .bind(&patch.sku)
            .bind(patch.cost_price)
            .bind(patch.selling_price)
            .bind(patch.quantity)
            .bind(&patch.unit)
            .bind(patch.reorder_level)
            .bind(&patch.supplier_name)
            .bind(patch.status.map(|s| s.as_str()))
            .bind(set_image)
            .bind(image)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| translate(e, "category"))?
            .ok_or(StoreError::not_found("product"))?;
        product_from_row(&row)
    }

    async fn delete_product(&self, scope: &TenantScope, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(scope.tenant_id())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("product"));
        }
        Ok(())
    }
}
