// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-rendered HTML pages.

use crate::middleware::auth::{current_user, CurrentUser};
use crate::models::User;
use crate::AppState;
use axum::{extract::State, response::Html, routing::get, Extension, Router};
use axum_extra::extract::cookie::CookieJar;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::sync::Arc;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(home))
}

/// Pages behind the session guard (applied in routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/profile", get(profile))
}

/// Home page, showing who is logged in if anyone.
async fn home(State(state): State<Arc<AppState>>, jar: CookieJar) -> Html<String> {
    let user = current_user(&state, &jar).await;
    Html(render_home(user.as_ref()))
}

/// Profile page for the logged-in user.
async fn profile(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Html<String> {
    Html(render_profile(&user))
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{}</title>
  <style>
    body {{ font-family: sans-serif; max-width: 40rem; margin: 3rem auto; }}
    img.avatar {{ border-radius: 50%; width: 96px; height: 96px; }}
  </style>
</head>
<body>
{}
</body>
</html>"#,
        encode_text(title),
        body
    )
}

fn render_home(user: Option<&User>) -> String {
    let body = match user {
        Some(user) => format!(
            r#"  <h1>Welcome back, {}!</h1>
  <p><a href="/profile">View your profile</a></p>
  <p><a href="/logout">Log out</a></p>"#,
            encode_text(&user.name)
        ),
        None => r#"  <h1>Welcome</h1>
  <p><a href="/auth/login">Log in with Facebook</a></p>"#
            .to_string(),
    };
    layout("Home", &body)
}

fn render_profile(user: &User) -> String {
    let photo = user
        .photo
        .as_deref()
        .map(|url| {
            format!(
                "  <img class=\"avatar\" src=\"{}\" alt=\"Profile photo\" />\n",
                encode_double_quoted_attribute(url)
            )
        })
        .unwrap_or_default();

    let email = user
        .email
        .as_deref()
        .map(|email| encode_text(email).into_owned())
        .unwrap_or_else(|| "<em>not shared</em>".to_string());

    let body = format!(
        r#"{}  <h1>{}</h1>
  <p><strong>Email:</strong> {}</p>
  <p><strong>Facebook ID:</strong> {}</p>
  <p><a href="/">Home</a> | <a href="/logout">Log out</a></p>"#,
        photo,
        encode_text(&user.name),
        email,
        encode_text(&user.facebook_id),
    );
    layout("Profile", &body)
}
