// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie handling and the access guard for protected pages.

use crate::config::Config;
use crate::models::User;
use crate::routes::found;
use crate::tokens::{sign_cookie_value, verify_cookie_value};
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

/// Name of the cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "fbl_session";

/// User resolved from the session cookie, inserted by [`require_session`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Session token from the request cookies, if present and correctly signed.
pub fn session_token(jar: &CookieJar, signing_key: &[u8]) -> Option<String> {
    let cookie = jar.get(SESSION_COOKIE)?;
    match verify_cookie_value(cookie.value(), signing_key) {
        Some(token) => Some(token.to_string()),
        None => {
            tracing::warn!("Ignoring session cookie with bad signature");
            None
        }
    }
}

/// Resolve the logged-in user for a request, if any.
pub async fn current_user(state: &AppState, jar: &CookieJar) -> Option<User> {
    let token = session_token(jar, &state.config.session_secret)?;
    state.sessions.resolve(&token).await
}

/// Cookie carrying a freshly started session.
pub fn session_cookie(token: &str, config: &Config) -> crate::error::Result<Cookie<'static>> {
    let value = sign_cookie_value(token, &config.session_secret)?;
    Ok(Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies())
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(config.session_ttl.num_seconds()))
        .build())
}

/// Cookie that clears the session cookie; attributes match [`session_cookie`].
pub fn session_cookie_removal(config: &Config) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE)
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies())
        .same_site(SameSite::Lax)
        .build()
}

/// Middleware that requires a live session, redirecting home otherwise.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(user) = current_user(&state, &jar).await else {
        tracing::debug!(path = %request.uri().path(), "No session, redirecting home");
        return found("/");
    };

    request.extensions_mut().insert(CurrentUser(user));

    next.run(request).await
}
