use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Discontinued,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Discontinued => "discontinued",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ProductStatus::Active),
            "inactive" => Ok(ProductStatus::Inactive),
            "discontinued" => Ok(ProductStatus::Discontinued),
            other => Err(UnknownVariant { kind: "product status", value: other.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub sku: String,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub quantity: i64,
    pub unit: String,
    pub reorder_level: i64,
    pub supplier_name: String,
    pub status: ProductStatus,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Low stock means the quantity has fallen to or below the reorder level.
    pub fn is_low_stock(&self) -> bool {
        is_low_stock(self.quantity, self.reorder_level)
    }
}

pub fn is_low_stock(quantity: i64, reorder_level: i64) -> bool {
    quantity <= reorder_level
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub sku: String,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub quantity: i64,
    pub unit: String,
    pub reorder_level: i64,
    pub supplier_name: String,
    pub status: ProductStatus,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
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
    pub image: Option<Option<String>>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category_id.is_none()
            && self.sku.is_none()
            && self.cost_price.is_none()
            && self.selling_price.is_none()
            && self.quantity.is_none()
            && self.unit.is_none()
            && self.reorder_level.is_none()
            && self.supplier_name.is_none()
            && self.status.is_none()
            && self.image.is_none()
    }

    pub fn apply(&self, product: &mut Product) {
        if let Some(v) = &self.name {
            product.name = v.clone();
        }
        if let Some(v) = self.category_id {
            product.category_id = v;
        }
        if let Some(v) = &self.sku {
            product.sku = v.clone();
        }
        if let Some(v) = self.cost_price {
            product.cost_price = v;
        }
        if let Some(v) = self.selling_price {
            product.selling_price = v;
        }
        if let Some(v) = self.quantity {
            product.quantity = v;
        }
        if let Some(v) = &self.unit {
            product.unit = v.clone();
        }
        if let Some(v) = self.reorder_level {
            product.reorder_level = v;
        }
        if let Some(v) = &self.supplier_name {
            product.supplier_name = v.clone();
        }
        if let Some(v) = self.status {
            product.status = v;
        }
        if let Some(v) = &self.image {
            product.image = v.clone();
        }
    }
}

/// Optional list constraints. Each one narrows the result further; the
/// tenant constraint is applied by the store and is not part of this type.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
    pub supplier_name: Option<String>,
    pub unit: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub low_stock: bool,
    pub search: Option<String>,
}

impl ProductFilter {
    /// In-process evaluation, kept equivalent to the SQL built by
    /// `ScopedQuery::product_list`.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category_id) = self.category_id {
            if product.category_id != category_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if product.status != status {
                return false;
            }
        }
        if let Some(supplier) = &self.supplier_name {
            if !product.supplier_name.eq_ignore_ascii_case(supplier) {
                return false;
            }
        }
        if let Some(unit) = &self.unit {
            if &product.unit != unit {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if product.selling_price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.selling_price > max {
                return false;
            }
        }
        if self.low_stock && !product.is_low_stock() {
            return false;
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            if !product.name.to_lowercase().contains(&term)
                && !product.sku.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        true
    }
}
