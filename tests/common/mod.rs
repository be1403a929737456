#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use inventory_api::config::{AppConfig, JwtSecret};
use inventory_api::database::MemoryStore;
use inventory_api::{app, AppState};

pub const TEST_SECRET: &str = "integration-test-signing-secret";
pub const ADMIN_EMAIL: &str = "root@platform.test";
pub const ADMIN_PASSWORD: &str = "platform-password";
pub const OWNER_PASSWORD: &str = "owner-password";

/// Router over a fresh in-memory store, driven in-process.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

/// A provisioned tenant whose owner has accepted the invite.
pub struct TenantFixture {
    pub id: String,
    pub slug: String,
    pub owner_id: String,
    pub owner_email: String,
    pub owner_token: String,
}

pub fn test_config() -> AppConfig {
    let secret = JwtSecret::new(TEST_SECRET).expect("test secret is long enough");
    let mut config = AppConfig::development(secret);
    config.security.bcrypt_cost = 4;
    config.security.max_impersonation_minutes = 60;
    config
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let state = AppState::new(config, Arc::new(MemoryStore::new()));
        state
            .auth
            .create_super_admin("Root", ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .expect("create super admin");
        let router = app(state.clone());
        Self { router, state }
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).expect("serialize body"))
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, path, token, None).await
    }

    pub async fn admin_token(&self) -> String {
        let (status, body) = self
            .post(
                "/admin/login",
                None,
                json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "admin login failed: {}", body);
        body["data"]["token"].as_str().expect("token").to_string()
    }

    /// Provision a tenant and return the raw body, invite token included.
    pub async fn provision(&self, slug: &str) -> Value {
        let admin = self.admin_token().await;
        let (status, body) = self
            .post(
                "/admin/tenants",
                Some(&admin),
                json!({
                    "name": format!("{} Inc", slug),
                    "slug": slug,
                    "ownerName": "Olive Owner",
                    "ownerEmail": format!("owner@{}.test", slug),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "provision failed: {}", body);
        body
    }

    /// Provision a tenant and accept its invite.
    pub async fn tenant(&self, slug: &str) -> TenantFixture {
        let provisioned = self.provision(slug).await;
        let invite = provisioned["data"]["inviteToken"].as_str().expect("invite token");

        let (status, body) = self
            .post(
                "/accept-invite",
                None,
                json!({ "inviteToken": invite, "password": OWNER_PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "accept invite failed: {}", body);

        TenantFixture {
            id: provisioned["data"]["tenant"]["id"].as_str().expect("id").to_string(),
            slug: slug.to_string(),
            owner_id: body["data"]["user"]["id"].as_str().expect("user id").to_string(),
            owner_email: format!("owner@{}.test", slug),
            owner_token: body["data"]["token"].as_str().expect("token").to_string(),
        }
    }

    pub async fn login(&self, slug: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.post(
            "/login",
            None,
            json!({ "slug": slug, "email": email, "password": password }),
        )
        .await
    }

    /// Create a user through the owner and log them in.
    pub async fn member(&self, tenant: &TenantFixture, email: &str, role: &str) -> String {
        let (status, body) = self
            .post(
                "/users",
                Some(&tenant.owner_token),
                json!({ "name": "Member", "email": email, "role": role, "password": "member-password" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create user failed: {}", body);

        let (status, body) = self.login(&tenant.slug, email, "member-password").await;
        assert_eq!(status, StatusCode::OK, "member login failed: {}", body);
        body["data"]["token"].as_str().expect("token").to_string()
    }

    pub async fn category(&self, token: &str, name: &str) -> String {
        let (status, body) = self
            .post("/categories", Some(token), json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create category failed: {}", body);
        body["data"]["id"].as_str().expect("id").to_string()
    }

    pub async fn product(&self, token: &str, body: Value) -> Value {
        let (status, body) = self.post("/products", Some(token), body).await;
        assert_eq!(status, StatusCode::CREATED, "create product failed: {}", body);
        body["data"].clone()
    }
}

pub fn product_body(category_id: &str, sku: &str) -> Value {
    json!({
        "name": format!("Product {}", sku),
        "categoryId": category_id,
        "sku": sku,
        "costPrice": "5.00",
        "sellingPrice": "12.50",
        "quantity": 20,
        "unit": "pcs",
        "reorderLevel": 5,
        "supplierName": "Acme Supply"
    })
}

// Spawned binary, for the smoke test. Owned by the test and killed on drop.

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_inventory-api"));
        cmd.args(["serve", "--memory"])
            .env("PORT", port.to_string())
            .env("JWT_SECRET", TEST_SECRET)
            .env("SECURITY_BCRYPT_COST", "4")
            .env("SUPER_ADMIN_EMAIL", ADMIN_EMAIL)
            .env("SUPER_ADMIN_PASSWORD", ADMIN_PASSWORD)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub async fn spawn_server() -> Result<TestServer> {
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
