use axum::{
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::CredentialService;
use crate::config::AppConfig;
use crate::database::Store;
use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{owner_gate, platform_guard, tenant_guard};
use crate::services::{Audit, AuthService, InventoryService, TenantService, UserService};

/// Shared request state. Built once at startup; everything in it is
/// cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub credentials: Arc<CredentialService>,
    pub auth: AuthService,
    pub tenants: TenantService,
    pub inventory: InventoryService,
    pub users: UserService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        let credentials = Arc::new(CredentialService::from_config(&config.security));
        let audit = Audit::new(config.security.enable_audit_logging);

        Self {
            auth: AuthService::new(store.clone(), credentials.clone(), audit),
            tenants: TenantService::new(store.clone(), credentials.clone(), audit, &config.security),
            inventory: InventoryService::new(store.clone(), audit),
            users: UserService::new(store.clone(), credentials.clone(), audit),
            config: Arc::new(config),
            store,
            credentials,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        // Public
        .merge(public_routes())
        // Tenant tier
        .merge(tenant_routes(&state))
        // Super-admin tier
        .merge(admin_routes(&state))
        .fallback(not_found)
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root_get))
        .route("/health", get(public::health_get))
        .route("/login", post(public::login_post))
        .route("/accept-invite", post(public::accept_invite_post))
        .route("/admin/login", post(public::admin_login_post))
}

fn tenant_routes(state: &AppState) -> Router<AppState> {
    use protected::{categories, me, products};

    Router::new()
        .route("/me", get(me::me_get))
        .route(
            "/products",
            get(products::product_list).post(products::product_create),
        )
        .route(
            "/products/:id",
            get(products::product_get)
                .put(products::product_update)
                .delete(products::product_delete),
        )
        .route(
            "/categories",
            get(categories::category_list).post(categories::category_create),
        )
        .route(
            "/categories/:id",
            get(categories::category_get)
                .put(categories::category_update)
                .delete(categories::category_delete),
        )
        .merge(user_routes())
        // Applies to every route above, including the owner-gated ones,
        // and runs before owner_gate.
        .route_layer(from_fn_with_state(state.clone(), tenant_guard))
}

fn user_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/users", get(users::user_list).post(users::user_create))
        .route("/users/:id/suspend", post(users::user_suspend))
        .route("/users/:id/activate", post(users::user_activate))
        .route_layer(from_fn(owner_gate))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    use elevated::tenants;

    Router::new()
        .route("/admin/me", get(elevated::me::admin_me_get))
        .route(
            "/admin/tenants",
            get(tenants::tenant_list).post(tenants::tenant_create),
        )
        .route("/admin/tenants/:id", get(tenants::tenant_show))
        .route("/admin/tenants/:id/suspend", post(tenants::tenant_suspend))
        .route("/admin/tenants/:id/activate", post(tenants::tenant_activate))
        .route("/admin/tenants/:id/quota", put(tenants::tenant_quota))
        .route("/admin/tenants/:id/invite", post(tenants::tenant_invite))
        .route(
            "/admin/tenants/:id/impersonate",
            post(tenants::tenant_impersonate),
        )
        .route("/admin/tenants/:id/export", get(tenants::tenant_export))
        .route_layer(from_fn_with_state(state.clone(), platform_guard))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
