use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use configs::DatabaseConfig;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use server::startup;

struct TestApp {
    base_url: String,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Fresh in-memory database, migrated, served on an ephemeral port.
async fn start_server() -> anyhow::Result<TestApp> {
    let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..Default::default() };
    let db = startup::connect_database(&cfg).await?;
    let app = startup::build_app(db);

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

async fn create_product(app: &TestApp, body: Value) -> anyhow::Result<Value> {
    let res = client().post(app.url("/api/products")).json(&body).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    Ok(res.json::<Value>().await?)
}

fn timestamp(v: &Value) -> DateTime<Utc> {
    v.as_str().and_then(|s| s.parse().ok()).expect("RFC 3339 timestamp")
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url("/health")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_openapi_document_served() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url("/api-docs/openapi.json")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let doc = res.json::<Value>().await?;
    assert!(doc["paths"]["/api/products/{id}"].is_object());
    assert!(doc["paths"]["/api/users"].is_object());
    Ok(())
}

#[tokio::test]
async fn e2e_create_product_returns_location_and_body() -> anyhow::Result<()> {
    let app = start_server().await?;
    let before = Utc::now() - chrono::Duration::seconds(1);

    let res = client()
        .post(app.url("/api/products"))
        .json(&json!({"name": "Widget", "price": 9.99}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let location = res
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("location header");
    let body = res.json::<Value>().await?;

    let id = body["id"].as_i64().expect("numeric id");
    assert_eq!(location, format!("/api/products/{}", id));
    assert_eq!(body["name"], "Widget");
    assert!((body["price"].as_f64().unwrap() - 9.99).abs() < 1e-9);
    assert!(body["description"].is_null());
    assert!(body["updatedAt"].is_null());
    assert!(timestamp(&body["createdAt"]) >= before);

    let fetched = client().get(app.url(&location)).send().await?;
    assert_eq!(fetched.status(), HttpStatusCode::OK);
    assert_eq!(fetched.json::<Value>().await?["name"], "Widget");
    Ok(())
}

#[tokio::test]
async fn e2e_create_ignores_payload_id_and_lists_in_order() -> anyhow::Result<()> {
    let app = start_server().await?;
    let a = create_product(&app, json!({"id": 77, "name": "A", "price": 1.5})).await?;
    let b = create_product(&app, json!({"name": "B", "price": 2.5, "description": "second"})).await?;
    assert_ne!(a["id"], 77);
    assert_ne!(a["id"], b["id"]);

    let res = client().get(app.url("/api/products")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let list = res.json::<Vec<Value>>().await?;
    let names: Vec<&str> = list.iter().filter_map(|p| p["name"].as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(list[1]["description"], "second");
    Ok(())
}

#[tokio::test]
async fn e2e_invalid_products_are_rejected() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let long_name = "x".repeat(101);
    for body in [
        json!({"name": "Widget", "price": 0}),
        json!({"name": "Widget", "price": -1.0}),
        json!({"name": "", "price": 1.0}),
        json!({"name": long_name, "price": 1.0}),
        json!({"price": 1.0}),
        json!({"name": "Widget", "price": 0.001}),
        json!({"name": "Widget", "price": 99999999999999999999.0}),
    ] {
        let res = c.post(app.url("/api/products")).json(&body).send().await?;
        assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST, "body {}", body);
        assert!(res.json::<Value>().await?["error"].is_string());
    }

    let res = c
        .post(app.url("/api/products"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let list = c.get(app.url("/api/products")).send().await?.json::<Vec<Value>>().await?;
    assert!(list.is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_unknown_ids_are_not_found() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let res = c.get(app.url("/api/products/999")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    assert!(res.json::<Value>().await?["error"].is_string());

    let res = c
        .put(app.url("/api/products/999"))
        .json(&json!({"name": "Ghost", "price": 1.0}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let res = c.delete(app.url("/api/products/999")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let res = c.get(app.url("/api/products/abc")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn e2e_replace_with_mismatched_id_leaves_storage_unchanged() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    // Mismatch is reported before existence is checked.
    let res = c
        .put(app.url("/api/products/5"))
        .json(&json!({"id": 7, "name": "Other", "price": 2.0}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let created = create_product(&app, json!({"name": "Widget", "price": 9.99})).await?;
    let id = created["id"].as_i64().unwrap();
    let res = c
        .put(app.url(&format!("/api/products/{}", id)))
        .json(&json!({"id": id + 1, "name": "Other", "price": 2.0}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let after = c.get(app.url(&format!("/api/products/{}", id))).send().await?.json::<Value>().await?;
    assert_eq!(after, created);
    Ok(())
}

#[tokio::test]
async fn e2e_replace_overwrites_and_advances_updated_at() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let created = create_product(&app, json!({"name": "Widget", "description": "old", "price": 9.99})).await?;
    let id = created["id"].as_i64().unwrap();
    let item = app.url(&format!("/api/products/{}", id));

    let res = c.put(&item).json(&json!({"id": id, "name": "Widget v2", "price": 12.5})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    let first = c.get(&item).send().await?.json::<Value>().await?;
    assert_eq!(first["name"], "Widget v2");
    assert!(first["description"].is_null(), "full replace clears omitted fields");
    assert_eq!(first["createdAt"], created["createdAt"]);
    let first_updated = timestamp(&first["updatedAt"]);

    let res = c.put(&item).json(&json!({"name": "Widget v3", "price": 13.0})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    let second = c.get(&item).send().await?.json::<Value>().await?;
    assert!(timestamp(&second["updatedAt"]) > first_updated);

    let res = c.put(&item).json(&json!({"name": "Widget v4", "price": 0})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn e2e_delete_twice_is_not_found() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let created = create_product(&app, json!({"name": "Widget", "price": 9.99})).await?;
    let item = app.url(&format!("/api/products/{}", created["id"]));

    assert_eq!(c.delete(&item).send().await?.status(), HttpStatusCode::NO_CONTENT);
    assert_eq!(c.delete(&item).send().await?.status(), HttpStatusCode::NOT_FOUND);
    assert_eq!(c.get(&item).send().await?.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_user_lifecycle_never_exposes_password() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let res = c
        .post(app.url("/api/users"))
        .json(&json!({
            "name": "Ada",
            "email": "ada@example.com",
            "phoneNumber": "555-0100",
            "password": "S3curePass!"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let location = res
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("location header");
    let created = res.json::<Value>().await?;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(location, format!("/api/users/{}", id));
    assert_eq!(created["phoneNumber"], "555-0100");
    assert!(created.get("password").is_none());
    assert!(created.get("passwordHash").is_none());
    assert!(!created.to_string().contains("S3curePass!"));

    let item = app.url(&format!("/api/users/{}", id));
    let res = c
        .put(&item)
        .json(&json!({
            "id": id,
            "name": "Ada L.",
            "email": "ada@example.org",
            "phoneNumber": "555-0199",
            "password": "N3wPass!"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);

    let fetched = c.get(&item).send().await?.json::<Value>().await?;
    assert_eq!(fetched["email"], "ada@example.org");
    assert!(fetched["updatedAt"].is_string());
    assert!(fetched.get("passwordHash").is_none());

    let list = c.get(app.url("/api/users")).send().await?.json::<Vec<Value>>().await?;
    assert_eq!(list.len(), 1);

    assert_eq!(c.delete(&item).send().await?.status(), HttpStatusCode::NO_CONTENT);
    assert_eq!(c.delete(&item).send().await?.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_invalid_users_are_rejected() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let long_phone = "1".repeat(21);
    for body in [
        json!({"name": "Ada", "email": "not-an-email", "phoneNumber": "555", "password": "pw"}),
        json!({"name": "Ada", "email": "ada@example.com", "phoneNumber": long_phone, "password": "pw"}),
        json!({"name": "Ada", "email": "ada@example.com", "phoneNumber": "555"}),
    ] {
        let res = c.post(app.url("/api/users")).json(&body).send().await?;
        assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST, "body {}", body);
    }
    Ok(())
}

#[tokio::test]
async fn e2e_user_replace_with_mismatched_id_leaves_storage_unchanged() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let res = c
        .post(app.url("/api/users"))
        .json(&json!({
            "name": "Grace",
            "email": "grace@example.com",
            "phoneNumber": "555-0142",
            "password": "C0bolRules!"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let created = res.json::<Value>().await?;
    let id = created["id"].as_i64().unwrap();
    let item = app.url(&format!("/api/users/{}", id));

    let res = c
        .put(&item)
        .json(&json!({
            "id": id + 1,
            "name": "Mallory",
            "email": "mallory@example.com",
            "phoneNumber": "555-0666",
            "password": "0ther!"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert!(res.json::<Value>().await?["error"].is_string());

    let after = c.get(&item).send().await?.json::<Value>().await?;
    assert_eq!(after, created);
    Ok(())
}

#[tokio::test]
async fn e2e_item_routes_parse_integer_ids() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    for path in ["/api/users/abc", "/api/users/1.5", "/api/products/99999999999"] {
        let res = c.get(app.url(path)).send().await?;
        assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST, "path {}", path);
        assert!(res.json::<Value>().await?["error"].is_string());
    }
    let res = c.delete(app.url("/api/users/abc")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let res = c.get(app.url("/api/users/42")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}
