// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    extract::Query,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use facebook_login::config::Config;
use facebook_login::db::{Database, FirestoreDb, MemoryDb};
use facebook_login::routes::create_router;
use facebook_login::services::FacebookClient;
use facebook_login::AppState;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Test app wired to an in-memory store.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub memory: MemoryDb,
}

/// Create a test app on an in-memory store, talking to `facebook_url`.
#[allow(dead_code)]
pub fn create_test_app(facebook_url: &str) -> TestApp {
    create_test_app_with_config(Config::test_default(), facebook_url)
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config, facebook_url: &str) -> TestApp {
    let memory = MemoryDb::default();
    let (router, state) = build_app(config, Database::from(memory.clone()), facebook_url);
    TestApp {
        router,
        state,
        memory,
    }
}

/// Create a test app whose store is offline: every operation fails.
#[allow(dead_code)]
pub fn create_offline_app(facebook_url: &str) -> (Router, Arc<AppState>) {
    build_app(
        Config::test_default(),
        Database::from(FirestoreDb::new_mock()),
        facebook_url,
    )
}

fn build_app(config: Config, db: Database, facebook_url: &str) -> (Router, Arc<AppState>) {
    let facebook = FacebookClient::from_config(&config).with_base_urls(facebook_url, facebook_url);
    let state = Arc::new(AppState::new(config, db, facebook));
    (create_router(state.clone()), state)
}

// ─── Fake Facebook ───────────────────────────────────────────────

/// Authorization code the fake provider refuses.
#[allow(dead_code)]
pub const BAD_CODE: &str = "bad-code";

/// Serve a minimal Graph API on an ephemeral port.
///
/// Each entry maps an authorization code to the `/me` body returned for
/// it. Returns the base URL.
#[allow(dead_code)]
pub async fn spawn_fake_facebook(profiles: Vec<(&str, serde_json::Value)>) -> String {
    let profiles: Arc<HashMap<String, serde_json::Value>> = Arc::new(
        profiles
            .into_iter()
            .map(|(code, profile)| (format!("token-{code}"), profile))
            .collect(),
    );

    let app = Router::new()
        .route(
            "/oauth/access_token",
            routing::get(|Query(params): Query<HashMap<String, String>>| async move {
                let code = params.get("code").cloned().unwrap_or_default();
                if code == BAD_CODE || params.get("client_secret").is_none() {
                    return graph_error("Invalid verification code format.");
                }
                Json(serde_json::json!({
                    "access_token": format!("token-{code}"),
                    "token_type": "bearer",
                    "expires_in": 5183944
                }))
                .into_response()
            }),
        )
        .route(
            "/me",
            routing::get(move |headers: axum::http::HeaderMap| {
                let profiles = profiles.clone();
                async move {
                    let token = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|h| h.to_str().ok())
                        .and_then(|h| h.strip_prefix("Bearer "))
                        .unwrap_or_default();
                    match profiles.get(token) {
                        Some(profile) => Json(profile.clone()).into_response(),
                        None => graph_error("Invalid OAuth access token."),
                    }
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

fn graph_error(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": { "message": message, "type": "OAuthException", "code": 100 }
        })),
    )
        .into_response()
}

/// Profile body for the documented example user.
#[allow(dead_code)]
pub fn jane_doe() -> serde_json::Value {
    serde_json::json!({
        "id": "abc123",
        "name": "Jane Doe",
        "email": "jane@x.com",
        "picture": { "data": { "url": "http://x/p.jpg", "is_silhouette": false } }
    })
}

// ─── Request helpers ─────────────────────────────────────────────

#[allow(dead_code)]
pub async fn get(router: &Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut request = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[allow(dead_code)]
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap()
}

#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// The `name=value` pair of a Set-Cookie header, if the response sets `name`.
#[allow(dead_code)]
pub fn cookie_pair(response: &Response, name: &str) -> Option<String> {
    set_cookie_headers(response)
        .into_iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .map(|value| value.split(';').next().unwrap().to_string())
}

#[allow(dead_code)]
pub async fn body_text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

/// Start a login and return the OAuth `state` and the nonce cookie pair.
#[allow(dead_code)]
pub async fn begin_login(router: &Router) -> (String, String) {
    let response = get(router, "/auth/login", None).await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let state = location(&response)
        .split(['?', '&'])
        .find_map(|param| param.strip_prefix("state="))
        .expect("authorize URL carries state")
        .to_string();
    let nonce = cookie_pair(&response, "fbl_oauth_nonce").expect("nonce cookie set");

    (state, nonce)
}

/// Run the full login flow for `code`; returns the callback response.
#[allow(dead_code)]
pub async fn login(router: &Router, code: &str) -> Response {
    let (state, nonce) = begin_login(router).await;
    get(
        router,
        &format!("/auth/callback?code={code}&state={state}"),
        Some(&nonce),
    )
    .await
}

/// Run the full login flow and return the session cookie pair.
#[allow(dead_code)]
pub async fn login_session(router: &Router, code: &str) -> String {
    let response = login(router, code).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/profile");
    cookie_pair(&response, "fbl_session").expect("session cookie set")
}
