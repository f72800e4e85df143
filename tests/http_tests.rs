//! HTTP surface tests: the router driven in-process.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use tinylink::codegen::RandomCodes;
use tinylink::store::{MemoryLinkStore, SqliteLinkStore};
use tinylink::{router, AppState, LinkService, OwnerScoping};

// =============================================================================
// Test Setup
// =============================================================================

fn app(scoping: OwnerScoping) -> Router {
    let service = LinkService::new(
        Arc::new(MemoryLinkStore::new()),
        Arc::new(RandomCodes::seeded(1)),
        scoping,
    );
    router(Arc::new(AppState { service }))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

// =============================================================================
// Links API
// =============================================================================

#[tokio::test]
async fn create_returns_201_with_summary() {
    let app = app(OwnerScoping::Enabled);
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/links",
        Some(json!({ "originalUrl": "https://example.com/x?y=1#z", "ownerId": "alice" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["originalUrl"], "https://example.com/x?y=1#z");
    assert_eq!(body["clicks"], 0);
    assert!(body["lastClickedAt"].is_null());
    assert!(body["createdAt"].is_string());
    assert_eq!(body["shortCode"].as_str().unwrap().len(), 6);
    assert!(body.get("ownerId").is_none());
}

#[tokio::test]
async fn create_accepts_legacy_user_id() {
    let app = app(OwnerScoping::Enabled);
    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/links",
        Some(json!({ "originalUrl": "https://example.com", "shortCode": "legacy", "userId": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(&app, Method::GET, "/api/links/legacy?userId=alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shortCode"], "legacy");
}

#[tokio::test]
async fn create_error_statuses() {
    let app = app(OwnerScoping::Enabled);

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/links",
        Some(json!({ "originalUrl": "not a url", "ownerId": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid URL");

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/links",
        Some(json!({ "originalUrl": "https://example.com", "shortCode": "bad-code", "ownerId": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/links",
        Some(json!({ "originalUrl": "https://example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(&app, Method::POST, "/api/links", Some(json!({ "nope": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let taken = json!({ "originalUrl": "https://example.com", "shortCode": "abc123", "ownerId": "alice" });
    let (status, _) = send_json(&app, Method::POST, "/api/links", Some(taken.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send_json(&app, Method::POST, "/api/links", Some(taken)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("abc123"));
}

#[tokio::test]
async fn list_get_delete_are_owner_scoped() {
    let app = app(OwnerScoping::Enabled);
    for (code, owner) in [("a1", "alice"), ("a2", "alice"), ("b1", "bob")] {
        let (status, _) = send_json(
            &app,
            Method::POST,
            "/api/links",
            Some(json!({ "originalUrl": "https://example.com", "shortCode": code, "ownerId": owner })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send_json(&app, Method::GET, "/api/links?ownerId=alice", None).await;
    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["shortCode"].as_str().unwrap())
        .collect();
    assert_eq!(codes, ["a2", "a1"]);

    let (status, _) = send_json(&app, Method::GET, "/api/links", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(&app, Method::GET, "/api/links/b1?ownerId=alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(&app, Method::DELETE, "/api/links/b1?ownerId=alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send_json(&app, Method::DELETE, "/api/links/b1?ownerId=bob", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Link deleted successfully");

    let (status, _) = send_json(&app, Method::GET, "/api/links/b1?ownerId=bob", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn shared_namespace_needs_no_owner() {
    let app = app(OwnerScoping::Disabled);
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/links",
        Some(json!({ "originalUrl": "https://example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let code = body["shortCode"].as_str().unwrap().to_owned();

    let (status, body) = send_json(&app, Method::GET, "/api/links", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send_json(&app, Method::DELETE, &format!("/api/links/{code}"), None).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Redirect & health
// =============================================================================

#[tokio::test]
async fn redirect_is_302_and_counts_clicks() {
    let app = app(OwnerScoping::Enabled);
    send_json(
        &app,
        Method::POST,
        "/api/links",
        Some(json!({ "originalUrl": "https://example.com/landing?a=1", "shortCode": "go", "ownerId": "alice" })),
    )
    .await;

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(Request::get("/go").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://example.com/landing?a=1"
        );
    }

    let (_, body) = send_json(&app, Method::GET, "/api/links/go?ownerId=alice", None).await;
    assert_eq!(body["clicks"], 3);
    assert!(body["lastClickedAt"].is_string());
}

#[tokio::test]
async fn unknown_and_reserved_codes_are_404() {
    let app = app(OwnerScoping::Enabled);
    for uri in ["/missing", "/favicon.ico", "/code", "/api"] {
        let (status, _) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn healthz_reports_connected() {
    let app = app(OwnerScoping::Enabled);
    let (status, body) = send_json(&app, Method::GET, "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["database"], "connected");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn healthz_is_503_when_store_is_gone() {
    let store = SqliteLinkStore::in_memory().await.unwrap();
    let service = LinkService::new(
        Arc::new(store.clone()),
        Arc::new(RandomCodes::seeded(1)),
        OwnerScoping::Enabled,
    );
    let app = router(Arc::new(AppState { service }));

    tinylink::store::LinkStore::close(&store).await;

    let (status, body) = send_json(&app, Method::GET, "/healthz", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["ok"], false);
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn sqlite_backed_round_trip() {
    let store = SqliteLinkStore::in_memory().await.unwrap();
    let service = LinkService::new(
        Arc::new(store),
        Arc::new(RandomCodes::seeded(1)),
        OwnerScoping::Enabled,
    );
    let app = router(Arc::new(AppState { service }));

    let url = "https://example.com/p?q=a%20b&r=1#frag";
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/links",
        Some(json!({ "originalUrl": url, "ownerId": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let code = body["shortCode"].as_str().unwrap().to_owned();

    let (status, _) = send(&app, Method::GET, &format!("/{code}"), None).await;
    assert_eq!(status, StatusCode::FOUND);

    let (_, body) = send_json(&app, Method::GET, &format!("/api/links/{code}?ownerId=alice"), None).await;
    assert_eq!(body["originalUrl"], url);
    assert_eq!(body["clicks"], 1);
}
