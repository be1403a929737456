use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::audit::Audit;
use super::validation::{double_option, FieldErrors};
use crate::auth::TenantContext;
use crate::database::models::{
    Category, CategoryPatch, NewCategory, NewProduct, Product, ProductFilter, ProductPatch,
    ProductStatus, Role,
};
use crate::database::Store;
use crate::error::ApiError;

/// Roles allowed to change inventory. Every role may read it.
const WRITERS: &[Role] = &[Role::Owner, Role::Manager];

/// Product as returned to clients, with the stock flag computed from the
/// values just read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub is_low_stock: bool,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let is_low_stock = product.is_low_stock();
        Self { product, is_low_stock }
    }
}

/// Body of product create and update. On create the usual fields are
/// required; on update every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub tenant_id: Option<Uuid>,
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub sku: Option<String>,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    pub reorder_level: Option<i64>,
    pub supplier_name: Option<String>,
    pub status: Option<ProductStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub tenant_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
    pub supplier_name: Option<String>,
    pub unit: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub low_stock: Option<bool>,
    pub search: Option<String>,
}

/// Optional double-submit tenant id on reads and deletes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantQuery {
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub tenant_id: Option<Uuid>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ProductQuery {
    fn into_filter(self) -> Result<ProductFilter, ApiError> {
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(ApiError::field("minPrice", "Must not exceed maxPrice"));
            }
        }
        Ok(ProductFilter {
            category_id: self.category_id,
            status: self.status,
            supplier_name: non_blank(self.supplier_name),
            unit: non_blank(self.unit),
            min_price: self.min_price,
            max_price: self.max_price,
            low_stock: self.low_stock.unwrap_or(false),
            search: non_blank(self.search),
        })
    }
}

#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn Store>,
    audit: Audit,
}

impl InventoryService {
    pub fn new(store: Arc<dyn Store>, audit: Audit) -> Self {
        Self { store, audit }
    }

    // Products

    pub async fn create_product(
        &self,
        ctx: &TenantContext,
        input: ProductInput,
    ) -> Result<ProductView, ApiError> {
        ctx.ensure_role(WRITERS)?;
        ctx.confirm_tenant(input.tenant_id)?;

        let mut errors = FieldErrors::new();
        let name = errors.required_text("name", input.name.as_deref());
        let category_id = errors.required("categoryId", input.category_id);
        let sku = errors.required_text("sku", input.sku.as_deref());
        let cost_price = errors.required("costPrice", input.cost_price);
        let cost_price = errors.amount("costPrice", cost_price);
        let selling_price = errors.required("sellingPrice", input.selling_price);
        let selling_price = errors.amount("sellingPrice", selling_price);
        let quantity = errors.required("quantity", input.quantity);
        let quantity = errors.count("quantity", quantity);
        let unit = errors.required_text("unit", input.unit.as_deref());
        let reorder_level = errors.required("reorderLevel", input.reorder_level);
        let reorder_level = errors.count("reorderLevel", reorder_level);
        let supplier_name = errors.required_text("supplierName", input.supplier_name.as_deref());
        let image = errors.optional_text("image", input.image.flatten().as_deref());

        errors.finish()?;

        let (
            Some(name),
            Some(category_id),
            Some(sku),
            Some(cost_price),
            Some(selling_price),
            Some(quantity),
            Some(unit),
            Some(reorder_level),
            Some(supplier_name),
        ) = (
            name,
            category_id,
            sku,
            cost_price,
            selling_price,
            quantity,
            unit,
            reorder_level,
            supplier_name,
        )
        else {
            return Err(ApiError::validation("Validation failed", None));
        };

        let tenant = self
            .store
            .find_tenant(ctx.tenant_id())
            .await?
            .ok_or_else(|| ApiError::not_found("Tenant not found"))?;
        let current = self.store.count_products(&ctx.scope).await?;
        if !tenant.quota.allows_products(current) {
            return Err(ApiError::quota_exceeded("Product quota exceeded"));
        }

        self.ensure_category(ctx, category_id).await?;
        if self.store.find_product_by_sku(&ctx.scope, &sku).await?.is_some() {
            return Err(ApiError::Duplicate("A product with this SKU already exists".into()));
        }

        // The unique index still decides races the pre-check above cannot see.
        let product = self
            .store
            .create_product(
                &ctx.scope,
                NewProduct {
                    id: Uuid::new_v4(),
                    name,
                    category_id,
                    sku,
                    cost_price,
                    selling_price,
                    quantity,
                    unit,
                    reorder_level,
                    supplier_name,
                    status: input.status.unwrap_or_default(),
                    image,
                },
            )
            .await?;

        self.audit.tenant(ctx, "product.create", Some(product.id));
        Ok(product.into())
    }

    pub async fn list_products(
        &self,
        ctx: &TenantContext,
        query: ProductQuery,
    ) -> Result<Vec<ProductView>, ApiError> {
        ctx.confirm_tenant(query.tenant_id)?;
        let filter = query.into_filter()?;
        let products = self.store.list_products(&ctx.scope, &filter).await?;
        Ok(products.into_iter().map(ProductView::from).collect())
    }

    pub async fn get_product(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        query: TenantQuery,
    ) -> Result<ProductView, ApiError> {
        ctx.confirm_tenant(query.tenant_id)?;
        self.store
            .find_product(&ctx.scope, id)
            .await?
            .map(ProductView::from)
            .ok_or_else(|| ApiError::not_found("Product not found"))
    }

    pub async fn update_product(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: ProductInput,
    ) -> Result<ProductView, ApiError> {
        ctx.ensure_role(WRITERS)?;
        ctx.confirm_tenant(input.tenant_id)?;

        let mut errors = FieldErrors::new();
        let image = match input.image {
            Some(Some(image)) => errors.optional_text("image", Some(&image)).map(Some),
            Some(None) => Some(None),
            None => None,
        };
        let patch = ProductPatch {
            name: errors.optional_text("name", input.name.as_deref()),
            category_id: input.category_id,
            sku: errors.optional_text("sku", input.sku.as_deref()),
            cost_price: errors.amount("costPrice", input.cost_price),
            selling_price: errors.amount("sellingPrice", input.selling_price),
            quantity: errors.count("quantity", input.quantity),
            unit: errors.optional_text("unit", input.unit.as_deref()),
            reorder_level: errors.count("reorderLevel", input.reorder_level),
            supplier_name: errors.optional_text("supplierName", input.supplier_name.as_deref()),
            status: input.status,
            image,
        };
        errors.finish()?;
        if patch.is_empty() {
            return Err(ApiError::validation("No fields to update", None));
        }

        if self.store.find_product(&ctx.scope, id).await?.is_none() {
            return Err(ApiError::not_found("Product not found"));
        }
        if let Some(category_id) = patch.category_id {
            self.ensure_category(ctx, category_id).await?;
        }
        if let Some(sku) = &patch.sku {
            if let Some(existing) = self.store.find_product_by_sku(&ctx.scope, sku).await? {
                if existing.id != id {
                    return Err(ApiError::Duplicate("A product with this SKU already exists".into()));
                }
            }
        }

        let product = self.store.update_product(&ctx.scope, id, patch).await?;
        self.audit.tenant(ctx, "product.update", Some(product.id));
        Ok(product.into())
    }

    pub async fn delete_product(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        query: TenantQuery,
    ) -> Result<(), ApiError> {
        ctx.ensure_role(WRITERS)?;
        ctx.confirm_tenant(query.tenant_id)?;
        self.store.delete_product(&ctx.scope, id).await?;
        self.audit.tenant(ctx, "product.delete", Some(id));
        Ok(())
    }

    async fn ensure_category(&self, ctx: &TenantContext, category_id: Uuid) -> Result<(), ApiError> {
        match self.store.find_category(&ctx.scope, category_id).await? {
            Some(_) => Ok(()),
            None => Err(ApiError::not_found("Category not found")),
        }
    }

    // Categories

    pub async fn create_category(
        &self,
        ctx: &TenantContext,
        input: CategoryInput,
    ) -> Result<Category, ApiError> {
        ctx.ensure_role(WRITERS)?;
        ctx.confirm_tenant(input.tenant_id)?;

        let mut errors = FieldErrors::new();
        let name = errors.required_text("name", input.name.as_deref());
        let description = errors.optional_text("description", input.description.flatten().as_deref());
        errors.finish()?;
        let name = name.ok_or_else(|| ApiError::field("name", "This field is required"))?;

        let category = self
            .store
            .create_category(
                &ctx.scope,
                NewCategory {
                    id: Uuid::new_v4(),
                    name,
                    description,
                },
            )
            .await?;

        self.audit.tenant(ctx, "category.create", Some(category.id));
        Ok(category)
    }

    pub async fn list_categories(
        &self,
        ctx: &TenantContext,
        query: TenantQuery,
    ) -> Result<Vec<Category>, ApiError> {
        ctx.confirm_tenant(query.tenant_id)?;
        Ok(self.store.list_categories(&ctx.scope).await?)
    }

    pub async fn get_category(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        query: TenantQuery,
    ) -> Result<Category, ApiError> {
        ctx.confirm_tenant(query.tenant_id)?;
        self.store
            .find_category(&ctx.scope, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Category not found"))
    }

    pub async fn update_category(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: CategoryInput,
    ) -> Result<Category, ApiError> {
        ctx.ensure_role(WRITERS)?;
        ctx.confirm_tenant(input.tenant_id)?;

        let mut errors = FieldErrors::new();
        let description = match input.description {
            Some(Some(text)) => errors.optional_text("description", Some(&text)).map(Some),
            Some(None) => Some(None),
            None => None,
        };
        let patch = CategoryPatch {
            name: errors.optional_text("name", input.name.as_deref()),
            description,
        };
        errors.finish()?;
        if patch.name.is_none() && patch.description.is_none() {
            return Err(ApiError::validation("No fields to update", None));
        }

        let category = self.store.update_category(&ctx.scope, id, patch).await?;
        self.audit.tenant(ctx, "category.update", Some(category.id));
        Ok(category)
    }

    pub async fn delete_category(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        query: TenantQuery,
    ) -> Result<(), ApiError> {
        ctx.ensure_role(WRITERS)?;
        ctx.confirm_tenant(query.tenant_id)?;
        self.store.delete_category(&ctx.scope, id).await?;
        self.audit.tenant(ctx, "category.delete", Some(id));
        Ok(())
    }
}
