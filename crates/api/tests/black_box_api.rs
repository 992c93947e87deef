use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use pricelens_api::config::ApiConfig;
use pricelens_auth::roles::SUPER_ADMIN;
use pricelens_auth::JwtClaims;
use pricelens_core::AdminId;
use reqwest::StatusCode;
use serde_json::{json, Value};

const SECRET: &str = "black-box-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = pricelens_api::app::build_app(ApiConfig::for_secret(SECRET))
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn login(&self, login: &str, password: &str) -> String {
        let res = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({"login": login, "password": password}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "login as {login} failed");
        let body: Value = res.json().await.unwrap();
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn super_admin_token(&self) -> String {
        self.login("admin", "admin12345").await
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = self.client.request(method, self.url(path)).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req.send().await.unwrap();
        let status = res.status();
        let body = res.json().await.unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.send(reqwest::Method::GET, path, token, None).await
    }

    async fn post(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::POST, path, token, Some(body)).await
    }

    async fn public_get(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn public_post(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.post(self.url(path)).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    /// Create a product and walk it to `verified`.
    async fn verified_product(&self, token: &str, name: &str, price: u64) -> String {
        let (status, body) = self
            .post("/admin/products", token, json!({"name": name, "price": price}))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let id = body["data"]["id"].as_str().unwrap().to_string();

        for step in ["request-verification", "verify"] {
            let (status, body) = self
                .post(&format!("/admin/products/{id}/{step}"), token, json!({}))
                .await;
            assert_eq!(status, StatusCode::OK, "{step}: {body}");
        }
        id
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, sub: AdminId) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub,
        username: "ghost".to_string(),
        role: SUPER_ADMIN,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::spawn().await;
    let (status, body) = server.public_get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let server = TestServer::spawn().await;

    let res = server.client.get(server.url("/admin/products")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"], "unauthenticated");

    // Signed with a different secret.
    let forged = mint_jwt("not-the-secret", AdminId::new());
    let (status, _) = server.get("/admin/products", &forged).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Correct signature, but no such admin.
    let orphan = mint_jwt(SECRET, AdminId::new());
    let (status, _) = server.get("/admin/products", &orphan).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_bad_password_and_me_reports_permissions() {
    let server = TestServer::spawn().await;

    let res = server
        .client
        .post(server.url("/api/auth/login"))
        .json(&json!({"login": "admin", "password": "wrong-password"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let token = server.super_admin_token().await;
    let (status, me) = server.get("/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["username"], "admin");
    assert_eq!(me["data"]["role"], "super_admin");
    assert!(me["data"].get("password_hash").is_none());
    assert_eq!(me["data"]["permissions"], json!(["*"]));
}

#[tokio::test]
async fn product_becomes_public_only_once_published() {
    let server = TestServer::spawn().await;
    let token = server.super_admin_token().await;

    let id = server.verified_product(&token, "Kamera Mirrorless X100", 8_500_000).await;

    // Asking for drafts on the storefront still yields published products only.
    let (status, listing) = server.public_get("/api/products?status=draft&trashed=with").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["meta"]["total"], 0);

    let (status, published) = server
        .post(&format!("/admin/products/{id}/publish"), &token, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{published}");
    assert_eq!(published["data"]["status"], "published");
    let slug = published["data"]["slug"].as_str().unwrap().to_string();
    assert_eq!(slug, "kamera-mirrorless-x100");

    let (_, listing) = server.public_get("/api/products").await;
    assert_eq!(listing["meta"]["total"], 1);
    assert!(listing["data"][0].get("status").is_none());

    let (status, detail) = server.public_get(&format!("/api/products/{slug}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["data"]["view_count"], 1);
    assert!(detail["data"]["links"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn product_page_lists_cheapest_offer_first() {
    let server = TestServer::spawn().await;
    let token = server.super_admin_token().await;

    let (_, marketplaces) = server.get("/admin/marketplaces", &token).await;
    let marketplaces = marketplaces["data"].as_array().unwrap().clone();
    assert!(marketplaces.len() >= 2);

    let id = server.verified_product(&token, "Headphone ANC", 1_500_000).await;
    for (marketplace, price) in [(&marketplaces[0], 1_450_000), (&marketplaces[1], 1_399_000)] {
        let (status, body) = server
            .post(
                &format!("/admin/products/{id}/links"),
                &token,
                json!({
                    "marketplace_id": marketplace["id"],
                    "store_name": "Official Store",
                    "url": "https://example.com/headphone",
                    "price": price,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }
    server
        .post(&format!("/admin/products/{id}/publish"), &token, json!({}))
        .await;

    let (status, detail) = server.public_get("/api/products/headphone-anc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["data"]["lowest_price"], 1_399_000);
    let links = detail["data"]["links"].as_array().unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0]["price"], 1_399_000);

    let link_id = links[0]["id"].as_str().unwrap();
    let res = server
        .client
        .post(server.url(&format!("/api/links/{link_id}/click")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let click: Value = res.json().await.unwrap();
    assert_eq!(click["data"]["clicks"], 1);
}

#[tokio::test]
async fn anonymous_clicks_need_a_public_product() {
    let server = TestServer::spawn().await;
    let token = server.super_admin_token().await;

    let (_, marketplaces) = server.get("/admin/marketplaces", &token).await;
    let marketplace_id = marketplaces["data"][0]["id"].clone();

    let id = server.verified_product(&token, "Smartwatch Lite", 900_000).await;
    let (status, link) = server
        .post(
            &format!("/admin/products/{id}/links"),
            &token,
            json!({
                "marketplace_id": marketplace_id,
                "store_name": "Gadget Store",
                "url": "https://example.com/smartwatch",
                "price": 875_000,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{link}");
    let click_path = format!("/api/links/{}/click", link["data"]["id"].as_str().unwrap());

    // Verified but not yet published.
    let (status, body) = server.public_post(&click_path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["data"]["url"].is_null());

    server
        .post(&format!("/admin/products/{id}/publish"), &token, json!({}))
        .await;
    let (status, body) = server.public_post(&click_path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["clicks"], 1);

    let (status, _) = server
        .send(reqwest::Method::DELETE, &format!("/admin/products/{id}"), &token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server.public_post(&click_path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn error_envelope_maps_domain_errors() {
    let server = TestServer::spawn().await;
    let token = server.super_admin_token().await;

    let (status, body) = server.post("/admin/products", &token, json!({"price": 50})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["errors"]["name"].is_string());
    assert!(body["errors"]["price"].is_string());

    let (status, body) = server
        .get(&format!("/admin/products/{}", uuid_like()), &token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = server.get("/admin/products/not-an-id", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A draft cannot be published directly.
    let (_, created) = server
        .post("/admin/products", &token, json!({"name": "Drone Mini", "price": 4_000_000}))
        .await;
    let id = created["data"]["id"].as_str().unwrap();
    let (status, body) = server
        .post(&format!("/admin/products/{id}/publish"), &token, json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn bulk_publish_reports_partial_failure() {
    let server = TestServer::spawn().await;
    let token = server.super_admin_token().await;

    let ready = server.verified_product(&token, "Smartwatch S2", 2_100_000).await;
    let (_, draft) = server
        .post("/admin/products", &token, json!({"name": "Smartwatch S1", "price": 1_700_000}))
        .await;
    let draft = draft["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = server
        .post(
            "/admin/products/bulk",
            &token,
            json!({"action": "publish", "ids": [ready, draft]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["success_count"], 1);
    assert_eq!(body["data"]["failure_count"], 1);
    assert_eq!(body["data"]["level"], "warning");
    assert_eq!(body["data"]["failed"][0]["id"], draft.as_str());

    let (status, body) = server
        .post("/admin/products/bulk", &token, json!({"action": "explode", "ids": [ready]}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["action"].is_string());
}

#[tokio::test]
async fn htmx_bulk_answers_with_fragment_and_trigger() {
    let server = TestServer::spawn().await;
    let token = server.super_admin_token().await;

    let ready = server.verified_product(&token, "Robot Vacuum", 3_300_000).await;
    let missing = uuid_like();

    let res = server
        .client
        .post(server.url("/htmx/admin/products/bulk"))
        .bearer_auth(&token)
        .form(&[("action", "publish"), ("ids[]", ready.as_str()), ("ids[]", missing.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let trigger = res
        .headers()
        .get("hx-trigger")
        .expect("missing HX-Trigger")
        .to_str()
        .unwrap()
        .to_string();
    let trigger: Value = serde_json::from_str(&trigger).unwrap();
    assert_eq!(trigger["showToast"]["type"], "warning");
    assert_eq!(trigger["refreshProducts"], true);
    let html = res.text().await.unwrap();
    assert!(html.contains("bulk-result"));

    let res = server
        .client
        .post(server.url(&format!("/htmx/admin/products/{ready}/toggle-status")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("badge-archived"));
}

#[tokio::test]
async fn viewer_cannot_create_products_and_actions_are_audited() {
    let server = TestServer::spawn().await;
    let token = server.super_admin_token().await;

    let (status, body) = server
        .post(
            "/admin/users",
            &token,
            json!({
                "username": "viewer1",
                "email": "viewer1@pricelens.local",
                "name": "Read Only",
                "password": "viewer-pass-123",
                "role": "viewer",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let viewer = server.login("viewer1", "viewer-pass-123").await;
    let (status, _) = server.get("/admin/products", &viewer).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = server
        .post("/admin/products", &viewer, json!({"name": "Nope", "price": 1000}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, logs) = server.get("/admin/audit-logs?entity_type=admin", &token).await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = logs["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|l| l["action"].as_str())
        .collect();
    assert!(actions.contains(&"admin.create"));
    assert!(actions.contains(&"auth.login"));
}

fn uuid_like() -> String {
    AdminId::new().to_string()
}
