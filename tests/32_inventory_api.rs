mod common;

use axum::http::StatusCode;
use common::{product_body, TestApp};
use serde_json::json;

#[tokio::test]
async fn product_crud_round() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;
    let token = acme.owner_token.as_str();
    let tools = app.category(token, "Tools").await;

    let mut body = product_body(&tools, "HAM-001");
    body["costPrice"] = json!("12.345");
    body["image"] = json!("hammer.png");
    let created = app.product(token, body).await;
    assert_eq!(created["tenantId"], acme.id.as_str());
    assert_eq!(created["status"], "active");
    assert_eq!(created["costPrice"], "12.35");
    assert_eq!(created["isLowStock"], false);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = app.get(&format!("/products/{}", id), Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sku"], "HAM-001");

    let (status, body) = app
        .put(
            &format!("/products/{}", id),
            Some(token),
            json!({ "quantity": 5, "status": "inactive", "image": null }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["quantity"], 5);
    assert_eq!(body["data"]["status"], "inactive");
    assert_eq!(body["data"]["isLowStock"], true);
    assert!(body["data"]["image"].is_null());
    assert_eq!(body["data"]["name"], "Product HAM-001");

    let (status, body) = app.get("/products", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn other_tenants_resources_are_not_found() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;
    let globex = app.tenant("globex").await;

    let tools = app.category(&acme.owner_token, "Tools").await;
    let product = app.product(&acme.owner_token, product_body(&tools, "SKU-1")).await;
    let path = format!("/products/{}", product["id"].as_str().unwrap());
    let category_path = format!("/categories/{}", tools);

    let (status, body) = app.get(&path, Some(&globex.owner_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.get("data").is_none());

    let (status, _) = app
        .put(&path, Some(&globex.owner_token), json!({ "quantity": 0 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&path, Some(&globex.owner_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get(&category_path, Some(&globex.owner_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .put(&category_path, Some(&globex.owner_token), json!({ "name": "Mine" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&category_path, Some(&globex.owner_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = app.get("/products", Some(&globex.owner_token)).await;
    assert_eq!(listed["count"], 0);

    // Untouched for its owner.
    let (status, body) = app.get(&path, Some(&acme.owner_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity"], 20);
}

#[tokio::test]
async fn sku_is_unique_per_tenant() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;
    let globex = app.tenant("globex").await;
    let acme_tools = app.category(&acme.owner_token, "Tools").await;
    let globex_tools = app.category(&globex.owner_token, "Tools").await;

    app.product(&acme.owner_token, product_body(&acme_tools, "DUP-1")).await;

    let (status, body) = app
        .post("/products", Some(&acme.owner_token), product_body(&acme_tools, "DUP-1"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE");

    // Same SKU in another tenant is fine.
    app.product(&globex.owner_token, product_body(&globex_tools, "DUP-1")).await;

    // Renaming onto a taken SKU is refused as well.
    let other = app.product(&acme.owner_token, product_body(&acme_tools, "DUP-2")).await;
    let (status, body) = app
        .put(
            &format!("/products/{}", other["id"].as_str().unwrap()),
            Some(&acme.owner_token),
            json!({ "sku": "DUP-1" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE");
}

#[tokio::test]
async fn category_must_belong_to_the_same_tenant() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;
    let globex = app.tenant("globex").await;
    let foreign = app.category(&globex.owner_token, "Foreign").await;

    let (status, body) = app
        .post("/products", Some(&acme.owner_token), product_body(&foreign, "X-1"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Category not found");

    let own = app.category(&acme.owner_token, "Own").await;
    let product = app.product(&acme.owner_token, product_body(&own, "X-1")).await;
    let (status, body) = app
        .put(
            &format!("/products/{}", product["id"].as_str().unwrap()),
            Some(&acme.owner_token),
            json!({ "categoryId": foreign }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Category not found");
}

#[tokio::test]
async fn low_stock_boundary_drives_filter_and_flag() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;
    let token = acme.owner_token.as_str();
    let tools = app.category(token, "Tools").await;

    for (sku, quantity) in [("AT", 10), ("ABOVE", 11), ("BELOW", 9)] {
        let mut body = product_body(&tools, sku);
        body["quantity"] = json!(quantity);
        body["reorderLevel"] = json!(10);
        let product = app.product(token, body).await;
        assert_eq!(product["isLowStock"], quantity <= 10, "sku {}", sku);
    }

    let (status, body) = app.get("/products?lowStock=true", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    let mut skus: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["sku"].as_str().unwrap())
        .collect();
    skus.sort();
    assert_eq!(skus, vec!["AT", "BELOW"]);

    let (_, body) = app.get("/products?lowStock=false", Some(token)).await;
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn list_filters_are_additive() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;
    let token = acme.owner_token.as_str();
    let tools = app.category(token, "Tools").await;
    let paint = app.category(token, "Paint").await;

    let mut hammer = product_body(&tools, "HAM-1");
    hammer["name"] = json!("Claw Hammer");
    hammer["sellingPrice"] = json!(25);
    app.product(token, hammer).await;

    let mut mallet = product_body(&tools, "MAL-1");
    mallet["name"] = json!("Rubber Mallet");
    mallet["sellingPrice"] = json!(8);
    mallet["status"] = json!("discontinued");
    app.product(token, mallet).await;

    let mut blue = product_body(&paint, "PNT-1");
    blue["name"] = json!("Blue Paint");
    blue["unit"] = json!("litre");
    blue["supplierName"] = json!("Colour Co");
    app.product(token, blue).await;

    let count = |query: String| {
        let app = &app;
        async move {
            let (status, body) = app.get(&format!("/products?{}", query), Some(token)).await;
            assert_eq!(status, StatusCode::OK, "{}", body);
            body["count"].as_u64().unwrap()
        }
    };

    assert_eq!(count(format!("categoryId={}", tools)).await, 2);
    assert_eq!(count(format!("categoryId={}&status=active", tools)).await, 1);
    assert_eq!(count("search=hammer".to_string()).await, 1);
    assert_eq!(count("search=pnt".to_string()).await, 1);
    assert_eq!(count("minPrice=10".to_string()).await, 2);
    assert_eq!(count("minPrice=10&maxPrice=20".to_string()).await, 1);
    assert_eq!(count("unit=litre".to_string()).await, 1);
    assert_eq!(count("supplierName=colour%20co".to_string()).await, 1);
    assert_eq!(count("status=discontinued".to_string()).await, 1);

    let (status, body) = app.get("/products?minPrice=20&maxPrice=10", Some(token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["minPrice"].is_string());
}

#[tokio::test]
async fn delete_twice_reports_not_found() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;
    let tools = app.category(&acme.owner_token, "Tools").await;
    let product = app.product(&acme.owner_token, product_body(&tools, "DEL-1")).await;
    let path = format!("/products/{}", product["id"].as_str().unwrap());

    let (status, body) = app.delete(&path, Some(&acme.owner_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = app.delete(&path, Some(&acme.owner_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn client_tenant_id_is_only_a_confirmation() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;
    let globex = app.tenant("globex").await;
    let tools = app.category(&acme.owner_token, "Tools").await;

    let mut body = product_body(&tools, "TEN-1");
    body["tenantId"] = json!(globex.id);
    let (status, response) = app.post("/products", Some(&acme.owner_token), body).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(response["code"], "TENANT_MISMATCH");

    let (status, _) = app
        .get(&format!("/products?tenantId={}", globex.id), Some(&acme.owner_token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Nothing was written by the rejected create.
    let (_, listed) = app.get("/products", Some(&acme.owner_token)).await;
    assert_eq!(listed["count"], 0);

    let mut body = product_body(&tools, "TEN-1");
    body["tenantId"] = json!(acme.id);
    let product = app.product(&acme.owner_token, body).await;
    assert_eq!(product["tenantId"], acme.id.as_str());

    let (status, _) = app
        .delete(
            &format!("/products/{}?tenantId={}", product["id"].as_str().unwrap(), globex.id),
            Some(&acme.owner_token),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn staff_can_read_but_not_write() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;
    let tools = app.category(&acme.owner_token, "Tools").await;
    app.product(&acme.owner_token, product_body(&tools, "RO-1")).await;

    let staff = app.member(&acme, "sam@acme.test", "staff").await;
    let (status, body) = app.get("/products", Some(&staff)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, body) = app
        .post("/products", Some(&staff), product_body(&tools, "RO-2"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Insufficient permissions");

    let (status, _) = app
        .post("/categories", Some(&staff), json!({ "name": "Staff Picks" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let manager = app.member(&acme, "max@acme.test", "manager").await;
    app.product(&manager, product_body(&tools, "MGR-1")).await;
}

#[tokio::test]
async fn validation_reports_each_field() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;
    let tools = app.category(&acme.owner_token, "Tools").await;

    let (status, body) = app
        .post("/products", Some(&acme.owner_token), json!({ "name": "Nameless" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    for field in ["categoryId", "sku", "costPrice", "sellingPrice", "quantity", "unit", "reorderLevel", "supplierName"] {
        assert!(body["fields"][field].is_string(), "missing error for {}", field);
    }
    assert!(body["fields"].get("name").is_none());

    let mut negative = product_body(&tools, "NEG-1");
    negative["quantity"] = json!(-1);
    negative["sellingPrice"] = json!("-0.01");
    let (status, body) = app.post("/products", Some(&acme.owner_token), negative).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["quantity"].is_string());
    assert!(body["fields"]["sellingPrice"].is_string());

    let product = app.product(&acme.owner_token, product_body(&tools, "OK-1")).await;
    let (status, _) = app
        .put(
            &format!("/products/{}", product["id"].as_str().unwrap()),
            Some(&acme.owner_token),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn prices_are_bounded_and_keep_two_places() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;
    let token = acme.owner_token.as_str();
    let tools = app.category(token, "Tools").await;

    let mut huge = product_body(&tools, "BIG-1");
    huge["sellingPrice"] = json!("10000000000000");
    let (status, body) = app.post("/products", Some(token), huge).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["sellingPrice"].is_string());

    let mut body = product_body(&tools, "HALF-1");
    body["sellingPrice"] = json!(12.5);
    body["costPrice"] = json!("999999999999.99");
    let created = app.product(token, body).await;
    assert_eq!(created["sellingPrice"], "12.50");
    assert_eq!(created["costPrice"], "999999999999.99");

    let (status, body) = app
        .put(
            &format!("/products/{}", created["id"].as_str().unwrap()),
            Some(token),
            json!({ "costPrice": "1000000000000" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["costPrice"].is_string());
}

#[tokio::test]
async fn malformed_ids_are_not_found() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;

    let (status, _) = app.get("/products/not-a-uuid", Some(&acme.owner_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete("/categories/42", Some(&acme.owner_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn category_lifecycle() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;
    let token = acme.owner_token.as_str();

    let (status, body) = app
        .post("/categories", Some(token), json!({ "name": "Tools", "description": "Hand tools" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let tools = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app.post("/categories", Some(token), json!({ "name": "Tools" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE");

    let (status, body) = app
        .put(&format!("/categories/{}", tools), Some(token), json!({ "description": null }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["description"].is_null());
    assert_eq!(body["data"]["name"], "Tools");

    let product = app.product(token, product_body(&tools, "USE-1")).await;
    let (status, body) = app.delete(&format!("/categories/{}", tools), Some(token)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    app.delete(&format!("/products/{}", product["id"].as_str().unwrap()), Some(token))
        .await;
    let (status, _) = app.delete(&format!("/categories/{}", tools), Some(token)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/categories", Some(token)).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn product_quota_is_enforced() {
    let app = TestApp::new().await;
    let acme = app.tenant("acme").await;
    let admin = app.admin_token().await;
    let (status, _) = app
        .put(
            &format!("/admin/tenants/{}/quota", acme.id),
            Some(&admin),
            json!({ "maxProducts": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let tools = app.category(&acme.owner_token, "Tools").await;
    app.product(&acme.owner_token, product_body(&tools, "Q-1")).await;

    let (status, body) = app
        .post("/products", Some(&acme.owner_token), product_body(&tools, "Q-2"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "QUOTA_EXCEEDED");
}
