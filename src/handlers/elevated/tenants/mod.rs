// handlers/elevated/tenants/mod.rs - Tenant management handlers
//
// Tenant lifecycle on the super-admin plane. Each action is written to
// the audit trail with the acting super admin.

pub mod create; // POST /admin/tenants
pub mod export; // GET /admin/tenants/:id/export
pub mod impersonate; // POST /admin/tenants/:id/impersonate
pub mod invite; // POST /admin/tenants/:id/invite
pub mod list; // GET /admin/tenants
pub mod quota; // PUT /admin/tenants/:id/quota
pub mod show; // GET /admin/tenants/:id
pub mod status; // POST /admin/tenants/:id/suspend, /activate

pub use create::tenant_create;
pub use export::tenant_export;
pub use impersonate::tenant_impersonate;
pub use invite::tenant_invite;
pub use list::tenant_list;
pub use quota::tenant_quota;
pub use show::tenant_show;
pub use status::{tenant_activate, tenant_suspend};
