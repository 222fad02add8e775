// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end login tests against a fake Graph API.
//!
//! These tests drive `/auth/login` and `/auth/callback` through the
//! router and check what ends up in the user store and session cookie.

use axum::http::StatusCode;

mod common;
use common::{
    body_text, get, jane_doe, location, login, login_session, set_cookie_headers,
    spawn_fake_facebook, BAD_CODE,
};

/// Whether the response expires the OAuth nonce cookie.
fn clears_nonce(response: &axum::response::Response) -> bool {
    set_cookie_headers(response)
        .iter()
        .any(|c| c.starts_with("fbl_oauth_nonce=") && c.contains("Max-Age=0"))
}

#[tokio::test]
async fn test_login_redirects_to_facebook_with_email_scope() {
    let facebook = spawn_fake_facebook(vec![]).await;
    let app = common::create_test_app(&facebook);

    let response = get(&app.router, "/auth/login", None).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    let url = location(&response);
    assert!(url.starts_with(&format!("{facebook}/dialog/oauth?")));
    assert!(url.contains("client_id=test_app_id"));
    assert!(url.contains("scope=email"));
    assert!(url.contains("response_type=code"));
}

#[tokio::test]
async fn test_first_login_creates_user_and_session() {
    let facebook = spawn_fake_facebook(vec![("jane", jane_doe())]).await;
    let app = common::create_test_app(&facebook);

    let session = login_session(&app.router, "jane").await;

    assert_eq!(app.memory.user_count(), 1);
    assert_eq!(app.memory.session_count(), 1);

    let user = app.memory.get_user_by_facebook_id("abc123").unwrap();
    assert_eq!(user.name, "Jane Doe");
    assert_eq!(user.email.as_deref(), Some("jane@x.com"));
    assert_eq!(user.photo.as_deref(), Some("http://x/p.jpg"));

    let response = get(&app.router, "/profile", Some(&session)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Jane Doe"));
    assert!(html.contains("jane@x.com"));
    assert!(html.contains("http://x/p.jpg"));
}

#[tokio::test]
async fn test_repeat_login_reuses_user() {
    let facebook = spawn_fake_facebook(vec![("jane", jane_doe())]).await;
    let app = common::create_test_app(&facebook);

    login_session(&app.router, "jane").await;
    let first = app.memory.get_user_by_facebook_id("abc123").unwrap();

    let session = login_session(&app.router, "jane").await;

    assert_eq!(app.memory.user_count(), 1);
    let resolved = app
        .state
        .sessions
        .resolve(session.split_once('=').unwrap().1.split('.').next().unwrap())
        .await
        .expect("second session resolves");
    assert_eq!(resolved.id, first.id);
}

#[tokio::test]
async fn test_login_does_not_resync_profile() {
    let renamed = serde_json::json!({ "id": "abc123", "name": "Jane Smith" });
    let facebook =
        spawn_fake_facebook(vec![("jane", jane_doe()), ("renamed", renamed)]).await;
    let app = common::create_test_app(&facebook);

    login_session(&app.router, "jane").await;
    login_session(&app.router, "renamed").await;

    let user = app.memory.get_user_by_facebook_id("abc123").unwrap();
    assert_eq!(user.name, "Jane Doe");
    assert_eq!(user.email.as_deref(), Some("jane@x.com"));
}

#[tokio::test]
async fn test_login_without_email_or_photo() {
    let shy = serde_json::json!({ "id": "shy-1", "name": "Shy User" });
    let facebook = spawn_fake_facebook(vec![("shy", shy)]).await;
    let app = common::create_test_app(&facebook);

    let session = login_session(&app.router, "shy").await;

    let user = app.memory.get_user_by_facebook_id("shy-1").unwrap();
    assert_eq!(user.email, None);
    assert_eq!(user.photo, None);

    let response = get(&app.router, "/profile", Some(&session)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_provider_denial_redirects_home() {
    let facebook = spawn_fake_facebook(vec![]).await;
    let app = common::create_test_app(&facebook);
    let (state, nonce) = common::begin_login(&app.router).await;

    let response = get(
        &app.router,
        &format!(
            "/auth/callback?error=access_denied&error_reason=user_denied&state={state}"
        ),
        Some(&nonce),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
    assert_eq!(app.memory.user_count(), 0);
    assert!(common::cookie_pair(&response, "fbl_session").is_none());
}

#[tokio::test]
async fn test_code_exchange_failure_redirects_home() {
    let facebook = spawn_fake_facebook(vec![]).await;
    let app = common::create_test_app(&facebook);

    let response = login(&app.router, BAD_CODE).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
    assert_eq!(app.memory.user_count(), 0);
}

#[tokio::test]
async fn test_profile_fetch_failure_redirects_home() {
    // Exchange succeeds, but /me has no profile for the issued token.
    let facebook = spawn_fake_facebook(vec![]).await;
    let app = common::create_test_app(&facebook);

    let response = login(&app.router, "unknown").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
    assert_eq!(app.memory.session_count(), 0);
}

#[tokio::test]
async fn test_callback_without_nonce_cookie_is_rejected() {
    let facebook = spawn_fake_facebook(vec![("jane", jane_doe())]).await;
    let app = common::create_test_app(&facebook);
    let (state, _nonce) = common::begin_login(&app.router).await;

    let response = get(
        &app.router,
        &format!("/auth/callback?code=jane&state={state}"),
        None,
    )
    .await;

    assert_eq!(location(&response), "/");
    assert_eq!(app.memory.user_count(), 0);
}

#[tokio::test]
async fn test_callback_with_foreign_state_is_rejected() {
    let facebook = spawn_fake_facebook(vec![("jane", jane_doe())]).await;
    let app = common::create_test_app(&facebook);
    let (state, _) = common::begin_login(&app.router).await;
    let (_, other_nonce) = common::begin_login(&app.router).await;

    let response = get(
        &app.router,
        &format!("/auth/callback?code=jane&state={state}"),
        Some(&other_nonce),
    )
    .await;

    assert_eq!(location(&response), "/");
    assert_eq!(app.memory.user_count(), 0);
}

#[tokio::test]
async fn test_callback_without_code_redirects_home() {
    let facebook = spawn_fake_facebook(vec![]).await;
    let app = common::create_test_app(&facebook);
    let (state, nonce) = common::begin_login(&app.router).await;

    let response = get(
        &app.router,
        &format!("/auth/callback?state={state}"),
        Some(&nonce),
    )
    .await;

    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_store_failure_returns_server_error() {
    let facebook = spawn_fake_facebook(vec![("jane", jane_doe())]).await;
    let (router, _) = common::create_offline_app(&facebook);

    let response = login(&router, "jane").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(common::cookie_pair(&response, "fbl_session").is_none());
    assert!(clears_nonce(&response));
}

#[tokio::test]
async fn test_session_write_failure_leaves_no_user() {
    let facebook = spawn_fake_facebook(vec![("jane", jane_doe())]).await;
    let app = common::create_test_app(&facebook);
    app.memory.reject_session_writes(true);

    let response = login(&app.router, "jane").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(common::cookie_pair(&response, "fbl_session").is_none());
    assert!(clears_nonce(&response));
    assert_eq!(app.memory.user_count(), 0);
    assert_eq!(app.memory.session_count(), 0);

    // Once sessions can be written again the same account logs in cleanly.
    app.memory.reject_session_writes(false);
    login_session(&app.router, "jane").await;
    assert_eq!(app.memory.user_count(), 1);
    assert_eq!(app.memory.session_count(), 1);
}

#[tokio::test]
async fn test_relogin_ends_previous_session() {
    let facebook = spawn_fake_facebook(vec![("jane", jane_doe())]).await;
    let app = common::create_test_app(&facebook);

    let old_session = login_session(&app.router, "jane").await;

    let (state, nonce) = common::begin_login(&app.router).await;
    let response = get(
        &app.router,
        &format!("/auth/callback?code=jane&state={state}"),
        Some(&format!("{nonce}; {old_session}")),
    )
    .await;
    assert_eq!(location(&response), "/profile");

    assert_eq!(app.memory.session_count(), 1);
    let response = get(&app.router, "/profile", Some(&old_session)).await;
    assert_eq!(location(&response), "/");
}
