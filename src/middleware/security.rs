// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Security headers middleware.

use crate::config::Config;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Pages are plain server-rendered HTML: inline styles and images only.
const CONTENT_SECURITY_POLICY: &str =
    "default-src 'none'; img-src https: data:; style-src 'unsafe-inline'; frame-ancestors 'none'; form-action 'self'";

/// Plain-HTTP deployments also load `http:` photo URLs.
const CONTENT_SECURITY_POLICY_HTTP: &str =
    "default-src 'none'; img-src http: https: data:; style-src 'unsafe-inline'; frame-ancestors 'none'; form-action 'self'";

fn content_security_policy(config: &Config) -> &'static str {
    if config.secure_cookies() {
        CONTENT_SECURITY_POLICY
    } else {
        CONTENT_SECURITY_POLICY_HTTP
    }
}

/// Add security headers to all responses.
pub async fn add_security_headers(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static(content_security_policy(&state.config)),
    );
    // The login callback URL carries the authorization code; keep it out of
    // Referer headers sent to third parties.
    headers.insert("Referrer-Policy", HeaderValue::from_static("same-origin"));
    headers.insert("Cache-Control", HeaderValue::from_static("no-store"));

    response
}
