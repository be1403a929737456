pub mod audit;
pub mod auth_service;
pub mod inventory_service;
pub mod tenant_service;
pub mod user_service;
pub mod validation;

pub use audit::Audit;
pub use auth_service::AuthService;
pub use inventory_service::InventoryService;
pub use tenant_service::TenantService;
pub use user_service::UserService;
