// handlers/protected/mod.rs - Tenant handlers (tenant token required)
//
// Every route here sits behind `tenant_guard`, so each handler receives a
// `TenantContext` whose scope came from the verified token. User
// management additionally sits behind `owner_gate`.

pub mod categories; // /categories
pub mod me; // GET /me
pub mod products; // /products
pub mod users; // /users (owner gate)
