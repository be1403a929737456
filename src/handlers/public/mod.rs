// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition for both principals plus liveness probes.

pub mod accept_invite; // POST /accept-invite
pub mod admin_login; // POST /admin/login
pub mod health; // GET /, GET /health
pub mod login; // POST /login

pub use accept_invite::accept_invite_post;
pub use admin_login::admin_login_post;
pub use health::{health_get, root_get};
pub use login::login_post;
