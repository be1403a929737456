// handlers/elevated/mod.rs - Super-admin handlers (platform token required)
//
// Route prefix: /admin/*. Everything here sits behind `platform_guard`,
// which refuses tenant tokens. Operations that touch one tenant's data
// name that tenant explicitly in the path.

pub mod me; // GET /admin/me
pub mod tenants; // /admin/tenants/*
