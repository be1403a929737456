use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{
    Category, CategoryPatch, NewCategory, NewProduct, NewSuperAdmin, NewTenant, NewUser, Product,
    ProductFilter, ProductPatch, SuperAdmin, Tenant, TenantQuota, TenantStatus, User, UserStatus,
};
use crate::database::scope::TenantScope;
use crate::database::store::{keys, Store, StoreError, StoreResult};

/// In-process store. All writes take the single write lock, so the
/// uniqueness and same-tenant reference checks below behave like the
/// database indexes they stand in for.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    tenants: HashMap<Uuid, Tenant>,
    users: HashMap<Uuid, User>,
    super_admins: HashMap<Uuid, SuperAdmin>,
    categories: HashMap<Uuid, Category>,
    products: HashMap<Uuid, Product>,
}

impl State {
    fn user_email_taken(&self, tenant_id: Uuid, email: &str) -> bool {
        self.users
            .values()
            .any(|u| u.tenant_id == tenant_id && u.email == email)
    }

    fn category_name_taken(&self, tenant_id: Uuid, name: &str, except: Option<Uuid>) -> bool {
        self.categories
            .values()
            .any(|c| c.tenant_id == tenant_id && c.name == name && Some(c.id) != except)
    }

    fn sku_taken(&self, tenant_id: Uuid, sku: &str, except: Option<Uuid>) -> bool {
        self.products
            .values()
            .any(|p| p.tenant_id == tenant_id && p.sku == sku && Some(p.id) != except)
    }

    fn category_in_tenant(&self, tenant_id: Uuid, category_id: Uuid) -> bool {
        self.categories
            .get(&category_id)
            .map_or(false, |c| c.tenant_id == tenant_id)
    }

    fn tenant_mut(&mut self, id: Uuid) -> StoreResult<&mut Tenant> {
        self.tenants.get_mut(&id).ok_or(StoreError::not_found("tenant"))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_created<T, F>(mut items: Vec<T>, created: F) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    items.sort_by_key(|item| std::cmp::Reverse(created(item)));
    items
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn provision_tenant(&self, tenant: NewTenant, owner: NewUser) -> StoreResult<(Tenant, User)> {
        let mut state = self.state.write().await;

        if state.tenants.values().any(|t| t.slug == tenant.slug) {
            return Err(StoreError::Conflict { key: keys::TENANT_SLUG });
        }
        if state
            .tenants
            .values()
            .any(|t| t.invite_token_hash.as_deref() == Some(tenant.invite_token_hash.as_str()))
        {
            return Err(StoreError::Conflict { key: keys::TENANT_INVITE });
        }

        let now = Utc::now();
        let tenant = Tenant {
            id: tenant.id,
            name: tenant.name,
            slug: tenant.slug,
            status: TenantStatus::Trial,
            owner_user_id: owner.id,
            owner_email: tenant.owner_email,
            invite_token_hash: Some(tenant.invite_token_hash),
            invite_accepted: false,
            invite_expires_at: Some(tenant.invite_expires_at),
            contact: tenant.contact,
            business: tenant.business,
            quota: tenant.quota,
            created_at: now,
            updated_at: now,
        };
        let owner = User {
            id: owner.id,
            tenant_id: tenant.id,
            name: owner.name,
            email: owner.email,
            password_hash: owner.password_hash,
            role: owner.role,
            status: owner.status,
            created_at: now,
            updated_at: now,
        };

        state.tenants.insert(tenant.id, tenant.clone());
        state.users.insert(owner.id, owner.clone());
        Ok((tenant, owner))
    }

    async fn find_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>> {
        Ok(self.state.read().await.tenants.get(&id).cloned())
    }

    async fn find_tenant_by_slug(&self, slug: &str) -> StoreResult<Option<Tenant>> {
        let state = self.state.read().await;
        Ok(state.tenants.values().find(|t| t.slug == slug).cloned())
    }

    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>> {
        let state = self.state.read().await;
        let tenants = state.tenants.values().cloned().collect();
        Ok(sorted_by_created(tenants, |t: &Tenant| t.created_at))
    }

    async fn set_tenant_status(&self, id: Uuid, status: TenantStatus) -> StoreResult<Tenant> {
        let mut state = self.state.write().await;
        let tenant = state.tenant_mut(id)?;
        tenant.status = status;
        tenant.updated_at = Utc::now();
        Ok(tenant.clone())
    }

    async fn set_tenant_quota(&self, id: Uuid, quota: TenantQuota) -> StoreResult<Tenant> {
        let mut state = self.state.write().await;
        let tenant = state.tenant_mut(id)?;
        tenant.quota = quota;
        tenant.updated_at = Utc::now();
        Ok(tenant.clone())
    }

    async fn reissue_invite(
        &self,
        id: Uuid,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<Tenant> {
        let mut state = self.state.write().await;
        let tenant = state.tenant_mut(id)?;
        if tenant.invite_accepted {
            return Err(StoreError::Conflict { key: keys::INVITE_ACCEPTED });
        }
        tenant.invite_token_hash = Some(token_hash);
        tenant.invite_expires_at = Some(expires_at);
        tenant.updated_at = Utc::now();
        Ok(tenant.clone())
    }

    async fn accept_invite(
        &self,
        token_hash: &str,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> StoreResult<(Tenant, User)> {
        let mut state = self.state.write().await;

        let tenant_id = state
            .tenants
            .values()
            .find(|t| {
                !t.invite_accepted
                    && t.invite_token_hash.as_deref() == Some(token_hash)
                    && t.invite_expires_at.map_or(true, |exp| exp > now)
            })
            .map(|t| t.id)
            .ok_or(StoreError::not_found("invite"))?;

        let owner_id = state.tenants[&tenant_id].owner_user_id;
        let owner = state
            .users
            .get_mut(&owner_id)
            .filter(|u| u.tenant_id == tenant_id)
            .ok_or(StoreError::not_found("user"))?;
        owner.password_hash = Some(password_hash);
        owner.status = UserStatus::Active;
        owner.updated_at = now;
        let owner = owner.clone();

        let tenant = state.tenant_mut(tenant_id)?;
        tenant.invite_token_hash = None;
        tenant.invite_accepted = true;
        tenant.invite_expires_at = None;
        if tenant.status == TenantStatus::Trial {
            tenant.status = TenantStatus::Active;
        }
        tenant.updated_at = now;

        Ok((tenant.clone(), owner))
    }

    async fn create_super_admin(&self, admin: NewSuperAdmin) -> StoreResult<SuperAdmin> {
        let mut state = self.state.write().await;
        if state.super_admins.values().any(|a| a.email == admin.email) {
            return Err(StoreError::Conflict { key: keys::SUPER_ADMIN_EMAIL });
        }
        let admin = SuperAdmin {
            id: admin.id,
            name: admin.name,
            email: admin.email,
            password_hash: admin.password_hash,
            created_at: Utc::now(),
        };
        state.super_admins.insert(admin.id, admin.clone());
        Ok(admin)
    }

    async fn find_super_admin(&self, id: Uuid) -> StoreResult<Option<SuperAdmin>> {
        Ok(self.state.read().await.super_admins.get(&id).cloned())
    }

    async fn find_super_admin_by_email(&self, email: &str) -> StoreResult<Option<SuperAdmin>> {
        let state = self.state.read().await;
        Ok(state.super_admins.values().find(|a| a.email == email).cloned())
    }

    async fn count_super_admins(&self) -> StoreResult<i64> {
        Ok(self.state.read().await.super_admins.len() as i64)
    }

    async fn create_user(&self, scope: &TenantScope, user: NewUser) -> StoreResult<User> {
        let mut state = self.state.write().await;
        let tenant_id = scope.tenant_id();
        if !state.tenants.contains_key(&tenant_id) {
            return Err(StoreError::not_found("tenant"));
        }
        if state.user_email_taken(tenant_id, &user.email) {
            return Err(StoreError::Conflict { key: keys::USER_EMAIL });
        }
        let now = Utc::now();
        let user = User {
            id: user.id,
            tenant_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            status: user.status,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, scope: &TenantScope, id: Uuid) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(&id)
            .filter(|u| u.tenant_id == scope.tenant_id())
            .cloned())
    }

    async fn find_user_by_email(&self, scope: &TenantScope, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.tenant_id == scope.tenant_id() && u.email == email)
            .cloned())
    }

    async fn list_users(&self, scope: &TenantScope) -> StoreResult<Vec<User>> {
        let state = self.state.read().await;
        let users = state
            .users
            .values()
            .filter(|u| u.tenant_id == scope.tenant_id())
            .cloned()
            .collect();
        Ok(sorted_by_created(users, |u: &User| u.created_at))
    }

    async fn count_users(&self, scope: &TenantScope) -> StoreResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.tenant_id == scope.tenant_id())
            .count() as i64)
    }

    async fn set_user_status(&self, scope: &TenantScope, id: Uuid, status: UserStatus) -> StoreResult<User> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&id)
            .filter(|u| u.tenant_id == scope.tenant_id())
            .ok_or(StoreError::not_found("user"))?;
        user.status = status;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_user_password(&self, scope: &TenantScope, id: Uuid, password_hash: String) -> StoreResult<User> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&id)
            .filter(|u| u.tenant_id == scope.tenant_id())
            .ok_or(StoreError::not_found("user"))?;
        user.password_hash = Some(password_hash);
        user.status = UserStatus::Active;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn create_category(&self, scope: &TenantScope, category: NewCategory) -> StoreResult<Category> {
        let mut state = self.state.write().await;
        let tenant_id = scope.tenant_id();
        if state.category_name_taken(tenant_id, &category.name, None) {
            return Err(StoreError::Conflict { key: keys::CATEGORY_NAME });
        }
        let now = Utc::now();
        let category = Category {
            id: category.id,
            tenant_id,
            name: category.name,
            description: category.description,
            created_at: now,
            updated_at: now,
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_category(&self, scope: &TenantScope, id: Uuid) -> StoreResult<Option<Category>> {
        let state = self.state.read().await;
        Ok(state
            .categories
            .get(&id)
            .filter(|c| c.tenant_id == scope.tenant_id())
            .cloned())
    }

    async fn list_categories(&self, scope: &TenantScope) -> StoreResult<Vec<Category>> {
        let state = self.state.read().await;
        let mut categories: Vec<Category> = state
            .categories
            .values()
            .filter(|c| c.tenant_id == scope.tenant_id())
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn update_category(&self, scope: &TenantScope, id: Uuid, patch: CategoryPatch) -> StoreResult<Category> {
        let mut state = self.state.write().await;
        let tenant_id = scope.tenant_id();
        if let Some(name) = &patch.name {
            if state.category_name_taken(tenant_id, name, Some(id)) {
                return Err(StoreError::Conflict { key: keys::CATEGORY_NAME });
            }
        }
        let category = state
            .categories
            .get_mut(&id)
            .filter(|c| c.tenant_id == tenant_id)
            .ok_or(StoreError::not_found("category"))?;
        patch.apply(category);
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete_category(&self, scope: &TenantScope, id: Uuid) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let tenant_id = scope.tenant_id();
        if !state.category_in_tenant(tenant_id, id) {
            return Err(StoreError::not_found("category"));
        }
        if state
            .products
            .values()
            .any(|p| p.tenant_id == tenant_id && p.category_id == id)
        {
            return Err(StoreError::Conflict { key: keys::CATEGORY_IN_USE });
        }
        state.categories.remove(&id);
        Ok(())
    }

    async fn create_product(&self, scope: &TenantScope, product: NewProduct) -> StoreResult<Product> {
        let mut state = self.state.write().await;
        let tenant_id = scope.tenant_id();
        if !state.category_in_tenant(tenant_id, product.category_id) {
            return Err(StoreError::not_found("category"));
        }
        if state.sku_taken(tenant_id, &product.sku, None) {
            return Err(StoreError::Conflict { key: keys::PRODUCT_SKU });
        }
        let now = Utc::now();
        let product = Product {
            id: product.id,
            tenant_id,
            name: product.name,
            category_id: product.category_id,
            sku: product.sku,
            cost_price: product.cost_price,
            selling_price: product.selling_price,
            quantity: product.quantity,
            unit: product.unit,
            reorder_level: product.reorder_level,
            supplier_name: product.supplier_name,
            status: product.status,
            image: product.image,
            created_at: now,
            updated_at: now,
        };
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn find_product(&self, scope: &TenantScope, id: Uuid) -> StoreResult<Option<Product>> {
        let state = self.state.read().await;
        Ok(state
            .products
            .get(&id)
            .filter(|p| p.tenant_id == scope.tenant_id())
            .cloned())
    }

    async fn find_product_by_sku(&self, scope: &TenantScope, sku: &str) -> StoreResult<Option<Product>> {
        let state = self.state.read().await;
        Ok(state
            .products
            .values()
            .find(|p| p.tenant_id == scope.tenant_id() && p.sku == sku)
            .cloned())
    }

    async fn list_products(&self, scope: &TenantScope, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let state = self.state.read().await;
        let products = state
            .products
            .values()
            .filter(|p| p.tenant_id == scope.tenant_id())
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        Ok(sorted_by_created(products, |p: &Product| p.created_at))
    }

    async fn count_products(&self, scope: &TenantScope) -> StoreResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .products
            .values()
            .filter(|p| p.tenant_id == scope.tenant_id())
            .count() as i64)
    }

    async fn update_product(&self, scope: &TenantScope, id: Uuid, patch: ProductPatch) -> StoreResult<Product> {
        let mut state = self.state.write().await;
        let tenant_id = scope.tenant_id();

        let owned = state
            .products
            .get(&id)
            .map_or(false, |p| p.tenant_id == tenant_id);
        if !owned {
            return Err(StoreError::not_found("product"));
        }
        if let Some(category_id) = patch.category_id {
            if !state.category_in_tenant(tenant_id, category_id) {
                return Err(StoreError::not_found("category"));
            }
        }
        if let Some(sku) = &patch.sku {
            if state.sku_taken(tenant_id, sku, Some(id)) {
                return Err(StoreError::Conflict { key: keys::PRODUCT_SKU });
            }
        }

        let product = state
            .products
            .get_mut(&id)
            .ok_or(StoreError::not_found("product"))?;
        patch.apply(product);
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete_product(&self, scope: &TenantScope, id: Uuid) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let owned = state
            .products
            .get(&id)
            .map_or(false, |p| p.tenant_id == scope.tenant_id());
        if !owned {
            return Err(StoreError::not_found("product"));
        }
        state.products.remove(&id);
        Ok(())
    }
}
