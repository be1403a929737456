pub mod category;
pub mod product;
pub mod super_admin;
pub mod tenant;
pub mod user;

pub use category::{Category, CategoryPatch, NewCategory};
pub use product::{NewProduct, Product, ProductFilter, ProductPatch, ProductStatus};
pub use super_admin::{NewSuperAdmin, SuperAdmin};
pub use tenant::{
    BusinessProfile, NewTenant, Tenant, TenantContact, TenantQuota, TenantStatus,
};
pub use user::{normalize_email, NewUser, Role, User, UserStatus};

/// Error returned when a stored enum value is not recognised.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
