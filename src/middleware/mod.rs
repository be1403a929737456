pub mod auth;
pub mod extract;
pub mod owner_gate;
pub mod response;

pub use auth::{platform_guard, tenant_guard};
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use owner_gate::owner_gate;
pub use response::{ApiList, ApiListResult, ApiResponse, ApiResult};
