//! Integration tests for the Bluespace backend.

mod projects;

use std::sync::Arc;

use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::auth::jwt::JwtConfig;
use crate::auth::password::hash_password;
use crate::config::{Config, Environment, LogFormat};
use crate::db::{init_database, Repository, DEMO_PASSWORD};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    /// Seeded store, tokens optional.
    async fn new() -> Self {
        Self::with_options(false, true).await
    }

    /// Seeded store, every protected route needs a token.
    async fn secured() -> Self {
        Self::with_options(true, true).await
    }

    /// Empty store.
    async fn empty() -> Self {
        Self::with_options(false, false).await
    }

    async fn with_options(require_auth: bool, seed: bool) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let database_url = format!("sqlite:{}", temp_dir.path().join("test.sqlite").display());

        let pool = init_database(&database_url)
            .await
            .expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        if seed {
            let hash = hash_password(DEMO_PASSWORD).expect("Failed to hash");
            repo.seed_demo_data(&hash).await.expect("Failed to seed");
        }

        let config = Config {
            database_url,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            environment: Environment::Development,
            log_level: "warn".to_string(),
            log_format: LogFormat::Text,
            jwt: JwtConfig {
                secret: "integration-test-secret".to_string(),
                token_ttl_mins: 60,
            },
            jwt_secret_is_default: false,
            require_auth,
            seed_demo: seed,
            cors_origins: vec!["http://localhost:3000".to_string()],
        };

        let state = AppState {
            repo,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give server time to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// Log in as a seeded account and return its token.
    async fn token_for(&self, email: &str, role: &str) -> String {
        let resp = self
            .post("/api/auth/login")
            .json(&json!({ "email": email, "password": DEMO_PASSWORD, "role": role }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn admin_token(&self) -> String {
        self.token_for("admin@bluespace.tech", "admin").await
    }
}

/// Send a request and return its status and JSON body.
async fn send(request: RequestBuilder) -> (u16, Value) {
    let resp = request.send().await.unwrap();
    let status = resp.status().as_u16();
    let body: Value = resp.json().await.unwrap();
    (status, body)
}

fn field_errors(body: &Value) -> Vec<(String, String)> {
    body["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .map(|e| {
                    (
                        e["field"].as_str().unwrap_or_default().to_string(),
                        e["message"].as_str().unwrap_or_default().to_string(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let (status, body) = send(fixture.get("/api/health")).await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Server is running");
    assert_eq!(body["data"]["status"], "ok");
    assert!(body["data"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_is_public_when_auth_required() {
    let fixture = TestFixture::secured().await;

    let (status, body) = send(fixture.get("/api/health")).await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_unknown_route() {
    let fixture = TestFixture::new().await;

    let (status, body) = send(fixture.get("/api/does-not-exist")).await;

    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route not found");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_unknown_route_is_404_even_when_auth_required() {
    let fixture = TestFixture::secured().await;

    let (status, body) = send(fixture.get("/api/nothing/here")).await;

    assert_eq!(status, 404);
    assert_eq!(body["message"], "Route not found");
}

#[tokio::test]
async fn test_malformed_json_body() {
    let fixture = TestFixture::new().await;

    let (status, body) = send(
        fixture
            .post("/api/projects")
            .header("content-type", "application/json")
            .body("{\"title\": "),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .request(reqwest::Method::OPTIONS, fixture.url("/api/projects"))
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .unwrap();

    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );
}

#[tokio::test]
async fn test_empty_store_lists() {
    let fixture = TestFixture::empty().await;

    let (status, body) = send(fixture.get("/api/users")).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"], json!([]));

    let (status, body) = send(fixture.get("/api/projects")).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"], json!([]));
}
