mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, TenantFixture};
use serde_json::{json, Value};

async fn user_id(app: &TestApp, tenant: &TenantFixture, email: &str) -> String {
    let (_, body) = app.get("/users", Some(&tenant.owner_token)).await;
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == email)
        .map(|u| u["id"].as_str().unwrap().to_string())
        .unwrap()
}

#[tokio::test]
async fn only_owners_manage_users() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;
    let manager = app.member(&acme, "max@acme.test", "manager").await;
    let staff = app.member(&acme, "sam@acme.test", "staff").await;

    for token in [&manager, &staff] {
        let (status, body) = app.get("/users", Some(token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Insufficient permissions");

        let (status, _) = app
            .post("/users", Some(token), json!({ "name": "Eve", "email": "eve@acme.test" }))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let (status, body) = app.get("/users", Some(&acme.owner_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    for user in body["data"].as_array().unwrap() {
        assert!(user.get("passwordHash").is_none());
    }
}

#[tokio::test]
async fn users_without_password_start_invited() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;

    let (status, body) = app
        .post(
            "/users",
            Some(&acme.owner_token),
            json!({ "name": "Ivy", "email": "Ivy@Acme.test" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "invited");
    assert_eq!(body["data"]["role"], "staff");
    assert_eq!(body["data"]["email"], "ivy@acme.test");
    let id = body["data"]["id"].as_str().unwrap();

    let (status, body) = app
        .post(&format!("/users/{}/activate", id), Some(&acme.owner_token), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["password"].is_string());

    let (status, body) = app.login("acme", "ivy@acme.test", "anything-at-all").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_PASSWORD");
}

#[tokio::test]
async fn invited_user_is_activated_with_a_password() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;

    let (_, body) = app
        .post(
            "/users",
            Some(&acme.owner_token),
            json!({ "name": "Ivy", "email": "ivy@acme.test", "role": "staff" }),
        )
        .await;
    let path = format!("/users/{}/activate", body["data"]["id"].as_str().unwrap());

    let (status, body) = app
        .post(&path, Some(&acme.owner_token), json!({ "password": "short" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["password"].is_string());

    let (status, body) = app
        .post(&path, Some(&acme.owner_token), json!({ "password": "ivy-password" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "active");
    assert!(body["data"].get("passwordHash").is_none());

    let (status, body) = app.login("acme", "ivy@acme.test", "ivy-password").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["role"], "staff");

    let token = body["data"]["token"].as_str().unwrap();
    let (status, _) = app.get("/products", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn activation_without_body_keeps_existing_password() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;
    app.member(&acme, "sam@acme.test", "staff").await;
    let sam = user_id(&app, &acme, "sam@acme.test").await;

    app.post(&format!("/users/{}/suspend", sam), Some(&acme.owner_token), json!({}))
        .await;
    let (status, _) = app
        .request(
            Method::POST,
            &format!("/users/{}/activate", sam),
            Some(&acme.owner_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.login("acme", "sam@acme.test", "member-password").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn suspension_blocks_login_and_activation_restores_it() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;
    let staff_token = app.member(&acme, "sam@acme.test", "staff").await;
    let sam = user_id(&app, &acme, "sam@acme.test").await;

    let (status, body) = app
        .post(&format!("/users/{}/suspend", sam), Some(&acme.owner_token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "suspended");

    let (status, _) = app.login("acme", "sam@acme.test", "member-password").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Tokens issued before the suspension stay valid until they expire.
    let (status, _) = app.get("/me", Some(&staff_token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(&format!("/users/{}/activate", sam), Some(&acme.owner_token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "active");

    let (status, _) = app.login("acme", "sam@acme.test", "member-password").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn owner_cannot_suspend_themself() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;

    let (status, _) = app
        .post(
            &format!("/users/{}/suspend", acme.owner_id),
            Some(&acme.owner_token),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.login("acme", &acme.owner_email, common::OWNER_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn owner_role_is_not_assignable() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;

    let (status, body) = app
        .post(
            "/users",
            Some(&acme.owner_token),
            json!({ "name": "Second", "email": "second@acme.test", "role": "owner" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["role"].is_string());
}

#[tokio::test]
async fn email_is_unique_per_tenant_only() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;
    let globex = app.tenant("globex").await;
    let body = json!({ "name": "Pat", "email": "pat@shared.test", "password": "pat-password" });

    let (status, _) = app.post("/users", Some(&acme.owner_token), body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, duplicate) = app.post("/users", Some(&acme.owner_token), body.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate["code"], "DUPLICATE");

    let (status, _) = app.post("/users", Some(&globex.owner_token), body).await;
    assert_eq!(status, StatusCode::CREATED);

    // Each login only sees its own tenant's account.
    let (status, acme_login) = app.login("acme", "pat@shared.test", "pat-password").await;
    assert_eq!(status, StatusCode::OK);
    let (status, globex_login) = app.login("globex", "pat@shared.test", "pat-password").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(acme_login["data"]["user"]["tenantId"], acme.id.as_str());
    assert_eq!(globex_login["data"]["user"]["tenantId"], globex.id.as_str());
    assert_ne!(acme_login["data"]["user"]["id"], globex_login["data"]["user"]["id"]);
}

#[tokio::test]
async fn user_quota_is_enforced() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;
    let admin = app.admin_token().await;
    app.put(
        &format!("/admin/tenants/{}/quota", acme.id),
        Some(&admin),
        json!({ "maxUsers": 2 }),
    )
    .await;

    let (status, _) = app
        .post("/users", Some(&acme.owner_token), json!({ "name": "A", "email": "a@acme.test" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body): (StatusCode, Value) = app
        .post("/users", Some(&acme.owner_token), json!({ "name": "B", "email": "b@acme.test" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "QUOTA_EXCEEDED");
}
