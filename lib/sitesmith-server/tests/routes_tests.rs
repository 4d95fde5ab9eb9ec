use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use generator::{ContentGenerator, GeneratorError, GeneratorResult};
use hosting::memory::InMemoryHosting;
use hosting::DeployOptions;
use serde_json::{json, Value};
use sites::{SiteService, SiteStore};
use sitesmith_server::{app, AppState};
use tower::ServiceExt;

struct PageGenerator;

#[async_trait]
impl ContentGenerator for PageGenerator {
    fn name(&self) -> &'static str {
        "page"
    }

    async fn generate(&self, instructions: &[String]) -> GeneratorResult<String> {
        Ok(format!(
            "<!DOCTYPE html><html><body>{}</body></html>",
            instructions.join(" | ")
        ))
    }
}

struct BrokenGenerator;

#[async_trait]
impl ContentGenerator for BrokenGenerator {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn generate(&self, _instructions: &[String]) -> GeneratorResult<String> {
        Err(GeneratorError::Http {
            status: 500,
            body: "model crashed at layer 12".to_string(),
        })
    }
}

struct TestServer {
    router: Router,
    hosting: Arc<InMemoryHosting>,
    _dir: tempfile::TempDir,
}

impl TestServer {
    fn with_generator(generator: Arc<dyn ContentGenerator>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let hosting = Arc::new(InMemoryHosting::new());
        let service = SiteService::new(
            hosting.clone(),
            generator,
            SiteStore::open(dir.path().join("sites.json")),
            dir.path().join("sites"),
            DeployOptions::default(),
        );
        let router = app(
            AppState {
                sites: Arc::new(service),
            },
            Duration::from_secs(30),
        );

        Self {
            router,
            hosting,
            _dir: dir,
        }
    }

    fn new() -> Self {
        Self::with_generator(Arc::new(PageGenerator))
    }

    async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(v) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_vec(&v).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }
}

#[tokio::test]
async fn health() {
    let server = TestServer::new();
    let (status, body) = server.request("GET", "/health", None).await;

    assert_eq!(StatusCode::OK, status);
    assert_eq!("ok", body["status"]);
}

#[tokio::test]
async fn prompt_status_and_listing() {
    let server = TestServer::new();

    let (status, body) = server
        .request(
            "POST",
            "/api/prompt",
            Some(json!({"site_name": "demo-site", "prompt": "A bakery"})),
        )
        .await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!("ok", body["status"]);
    assert_eq!("http://demo-site.netlify.app", body["deploy_url"]);

    let (status, body) = server.request("GET", "/api/status/demo-site", None).await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!(json!(1), body["prompts_count"]);
    assert_eq!("demo-site", body["site_name"]);

    let (_, body) = server.request("GET", "/api/sites", None).await;
    assert_eq!(json!(["A bakery"]), body["sites"]["demo-site"]["prompts"]);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn prompt_requires_site_name() {
    let server = TestServer::new();

    let (status, body) = server
        .request("POST", "/api/prompt", Some(json!({"prompt": "A bakery"})))
        .await;

    assert_eq!(StatusCode::BAD_REQUEST, status);
    assert_eq!("error", body["status"]);
    assert_eq!("site name is required", body["message"]);
}

#[tokio::test]
async fn invalid_domain_is_rejected_without_remote_calls() {
    let server = TestServer::new();

    let (status, body) = server
        .request(
            "POST",
            "/api/add_domain",
            Some(json!({"site_name": "demo-site", "domain": "notadomain"})),
        )
        .await;

    assert_eq!(StatusCode::BAD_REQUEST, status);
    assert_eq!("error", body["status"]);
    assert!(body["message"].as_str().unwrap().contains("notadomain"));
    assert_eq!(0, server.hosting.calls().total());
}

#[tokio::test]
async fn approve_flow() {
    let server = TestServer::new();
    server
        .request(
            "POST",
            "/api/prompt",
            Some(json!({"site_name": "demo-site", "prompt": "A bakery"})),
        )
        .await;

    let (status, body) = server
        .request(
            "POST",
            "/api/approve",
            Some(json!({"site_name": "demo-site", "approve": false})),
        )
        .await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!("continue", body["status"]);
    assert_eq!(Value::Null, body["deploy_url"]);

    let (status, body) = server
        .request(
            "POST",
            "/api/approve",
            Some(json!({"site_name": "demo-site", "approve": true})),
        )
        .await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!("approved", body["status"]);
    assert_eq!("https://demo-site.netlify.app", body["deploy_url"]);
}

#[tokio::test]
async fn unknown_site_is_not_found() {
    let server = TestServer::new();

    let (status, body) = server
        .request(
            "POST",
            "/api/reset_site_content",
            Some(json!({"site_name": "nobody"})),
        )
        .await;

    assert_eq!(StatusCode::NOT_FOUND, status);
    assert_eq!("error", body["status"]);
}

#[tokio::test]
async fn check_site_name_reports_validation_in_message() {
    let server = TestServer::new();

    let (status, body) = server
        .request(
            "POST",
            "/api/check_site_name",
            Some(json!({"site_name": "not valid"})),
        )
        .await;

    assert_eq!(StatusCode::OK, status);
    assert_eq!("ok", body["status"]);
    assert_eq!(false, body["exists"]);
    assert!(body["message"].as_str().unwrap().contains("not valid"));
}

#[tokio::test]
async fn generator_failure_hides_details() {
    let server = TestServer::with_generator(Arc::new(BrokenGenerator));

    let (status, body) = server
        .request(
            "POST",
            "/api/prompt",
            Some(json!({"site_name": "demo-site", "prompt": "A bakery"})),
        )
        .await;

    assert_eq!(StatusCode::BAD_GATEWAY, status);
    assert_eq!("error", body["status"]);
    assert!(!body["message"].as_str().unwrap().contains("layer 12"));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let server = TestServer::new();

    let (status, body) = server
        .request("POST", "/api/approve", Some(json!({"site_name": "demo-site"})))
        .await;

    assert_eq!(StatusCode::BAD_REQUEST, status);
    assert_eq!("error", body["status"]);
}

#[tokio::test]
async fn unknown_route() {
    let server = TestServer::new();

    let (status, body) = server.request("GET", "/nope", None).await;

    assert_eq!(StatusCode::NOT_FOUND, status);
    assert_eq!("error", body["status"]);
}
