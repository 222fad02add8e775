// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Facebook login routes.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::middleware::auth::{session_cookie, session_cookie_removal, session_token};
use crate::routes::found;
use crate::time_utils::unix_millis;
use crate::tokens::{random_token, sign, verify, TOKEN_BYTES};
use crate::AppState;

/// Cookie binding the OAuth state to the browser that started the login.
pub const OAUTH_NONCE_COOKIE: &str = "fbl_oauth_nonce";

/// Path the nonce cookie is scoped to.
const CALLBACK_PATH: &str = "/auth/callback";

/// How long a login attempt may take, in milliseconds.
const STATE_MAX_AGE_MS: u64 = 10 * 60 * 1000;

/// Allowed clock skew for state timestamps from the future, in milliseconds.
const STATE_MAX_SKEW_MS: u64 = 60 * 1000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", get(auth_start))
        .route(CALLBACK_PATH, get(auth_callback))
        .route("/logout", get(logout))
}

/// Start OAuth flow - redirect to the Facebook consent dialog.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Response)> {
    let nonce = random_token(TOKEN_BYTES)?;
    let oauth_state = encode_state(
        &nonce,
        unix_millis(chrono::Utc::now()),
        &state.config.session_secret,
    )?;

    let auth_url = state.facebook.authorize_url(&oauth_state);

    tracing::info!(
        app_id = %state.config.facebook_app_id,
        "Starting OAuth flow, redirecting to Facebook"
    );

    Ok((jar.add(nonce_cookie(nonce, &state.config)), found(&auth_url)))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_reason: Option<String>,
}

/// OAuth callback - exchange code for profile, find or create user, start session.
///
/// Anything that goes wrong on the Facebook side sends the browser home.
/// Store failures are ours and surface as an error page. Every response
/// clears the nonce cookie.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Response) {
    let cookie_nonce = jar.get(OAUTH_NONCE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(nonce_cookie_removal(&state.config));

    if let Some(error) = params.error {
        tracing::warn!(
            error = %error,
            reason = params.error_reason.as_deref().unwrap_or(""),
            "OAuth error from Facebook"
        );
        return (jar, found("/"));
    }

    let state_nonce = params.state.as_deref().and_then(|s| {
        verify_and_decode_state(s, &state.config.session_secret, unix_millis(chrono::Utc::now()))
    });

    match (state_nonce, cookie_nonce) {
        (Some(from_state), Some(from_cookie)) if from_state == from_cookie => {}
        _ => {
            tracing::warn!("OAuth state missing, expired, or not issued to this browser");
            return (jar, found("/"));
        }
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        tracing::warn!("OAuth callback without authorization code");
        return (jar, found("/"));
    };

    tracing::info!("Exchanging authorization code for profile");

    let profile = match state.facebook.authenticate(&code).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "Facebook login failed");
            return (jar, found("/"));
        }
    };

    let outcome = match state.auth.complete_login(profile).await {
        Ok(outcome) => outcome,
        Err(e) if e.is_provider_error() => {
            tracing::warn!(error = %e, "Facebook returned an unusable profile");
            return (jar, found("/"));
        }
        Err(e) => return (jar, e.into_response()),
    };

    // Drop any session this browser already had.
    if let Some(previous) = session_token(&jar, &state.config.session_secret) {
        if let Err(e) = state.sessions.end(&previous).await {
            tracing::warn!(error = %e, "Failed to end previous session");
        }
    }

    tracing::info!(
        user_id = %outcome.user.id,
        created = outcome.created,
        "OAuth successful, session started"
    );

    match session_cookie(&outcome.session_token, &state.config) {
        Ok(cookie) => (jar.add(cookie), found("/profile")),
        Err(e) => (jar, e.into_response()),
    }
}

/// Logout - end the server-side session and clear the cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Response) {
    if let Some(token) = session_token(&jar, &state.config.session_secret) {
        match state.sessions.end(&token).await {
            Ok(()) => tracing::info!("Session ended"),
            Err(e) => tracing::error!(error = %e, "Failed to end session"),
        }
    }

    (jar.remove(session_cookie_removal(&state.config)), found("/"))
}

fn nonce_cookie(nonce: String, config: &Config) -> Cookie<'static> {
    Cookie::build((OAUTH_NONCE_COOKIE, nonce))
        .path(CALLBACK_PATH)
        .http_only(true)
        .secure(config.secure_cookies())
        .same_site(SameSite::Lax)
        .max_age(time::Duration::milliseconds(STATE_MAX_AGE_MS as i64))
        .build()
}

fn nonce_cookie_removal(config: &Config) -> Cookie<'static> {
    Cookie::build(OAUTH_NONCE_COOKIE)
        .path(CALLBACK_PATH)
        .http_only(true)
        .secure(config.secure_cookies())
        .same_site(SameSite::Lax)
        .build()
}

/// Encode and sign the OAuth state: base64url("nonce|timestamp_hex|signature_hex").
fn encode_state(
    nonce: &str,
    now_ms: u64,
    secret: &[u8],
) -> std::result::Result<String, AppError> {
    let payload = format!("{}|{:x}", nonce, now_ms);
    let signed = format!("{}|{}", payload, sign(&payload, secret)?);
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify HMAC signature and age, and decode the nonce from the OAuth state.
fn verify_and_decode_state(state: &str, secret: &[u8], now_ms: u64) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Format is "nonce|timestamp_hex|signature_hex"
    let parts: Vec<&str> = state_str.splitn(3, '|').collect();
    if parts.len() != 3 {
        return None;
    }

    let nonce = parts[0];
    let timestamp_hex = parts[1];
    let signature_hex = parts[2];

    let payload = format!("{}|{}", nonce, timestamp_hex);
    if !verify(&payload, signature_hex, secret) {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    let issued_ms = u64::from_str_radix(timestamp_hex, 16).ok()?;
    if issued_ms > now_ms + STATE_MAX_SKEW_MS
        || now_ms.saturating_sub(issued_ms) > STATE_MAX_AGE_MS
    {
        tracing::warn!(issued_ms, now_ms, "OAuth state expired");
        return None;
    }

    Some(nonce.to_string())
}
