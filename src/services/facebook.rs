// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Facebook Login client.
//!
//! Handles:
//! - Building the consent dialog URL
//! - Exchanging the authorization code for an access token
//! - Fetching the user's profile from the Graph API

use crate::config::Config;
use crate::error::AppError;
use serde::Deserialize;

/// Facebook login dialog base URL.
pub const DEFAULT_DIALOG_BASE_URL: &str = "https://www.facebook.com/v19.0";

/// Graph API base URL.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.facebook.com/v19.0";

/// Permissions requested on the consent screen.
pub const SCOPES: &str = "email";

/// Profile fields requested from `/me`.
pub const PROFILE_FIELDS: &str = "id,name,first_name,last_name,email,picture.type(large)";

/// Facebook OAuth client.
#[derive(Clone)]
pub struct FacebookClient {
    http: reqwest::Client,
    dialog_base_url: String,
    graph_base_url: String,
    app_id: String,
    app_secret: String,
    callback_url: String,
}

impl FacebookClient {
    /// Create a new client with OAuth credentials.
    pub fn new(app_id: String, app_secret: String, callback_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            dialog_base_url: DEFAULT_DIALOG_BASE_URL.to_string(),
            graph_base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            app_id,
            app_secret,
            callback_url,
        }
    }

    /// Create a client from application config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.facebook_app_id.clone(),
            config.facebook_app_secret.clone(),
            config.facebook_callback_url.clone(),
        )
    }

    /// Point the client at different dialog/Graph hosts (used by tests).
    pub fn with_base_urls(mut self, dialog_base_url: &str, graph_base_url: &str) -> Self {
        self.dialog_base_url = dialog_base_url.trim_end_matches('/').to_string();
        self.graph_base_url = graph_base_url.trim_end_matches('/').to_string();
        self
    }

    /// URL of the consent dialog the browser is redirected to.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}/dialog/oauth?\
             client_id={}&\
             redirect_uri={}&\
             state={}&\
             response_type=code&\
             scope={}",
            self.dialog_base_url,
            urlencoding::encode(&self.app_id),
            urlencoding::encode(&self.callback_url),
            urlencoding::encode(state),
            SCOPES
        )
    }

    /// Exchange the authorization code and fetch the user's profile.
    pub async fn authenticate(&self, code: &str) -> Result<ProviderProfile, AppError> {
        let access_token = self.exchange_code(code).await?;
        self.fetch_profile(&access_token).await
    }

    /// Exchange an authorization code for a user access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, AppError> {
        let response = self
            .http
            .get(format!("{}/oauth/access_token", self.graph_base_url))
            .query(&[
                ("client_id", self.app_id.as_str()),
                ("client_secret", self.app_secret.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Token exchange failed: {}", e)))?;

        let token: AccessTokenResponse = self.check_response_json(response).await?;
        Ok(token.access_token)
    }

    /// Fetch the profile of the user owning `access_token`.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, AppError> {
        let proof = crate::tokens::sign(access_token, self.app_secret.as_bytes())?;

        let response = self
            .http
            .get(format!("{}/me", self.graph_base_url))
            .bearer_auth(access_token)
            .query(&[("fields", PROFILE_FIELDS), ("appsecret_proof", proof.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Profile request failed: {}", e)))?;

        let user: FacebookUser = self.check_response_json(response).await?;
        Ok(user.into())
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            let message = serde_json::from_str::<GraphErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            tracing::warn!(status = %status, message = %message, "Facebook API request failed");
            return Err(AppError::Provider(format!("HTTP {}: {}", status, message)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("JSON parse error: {}", e)))
    }
}

/// Token exchange response.
#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

/// Graph API error envelope.
#[derive(Debug, Deserialize)]
struct GraphErrorResponse {
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

/// `/me` response.
#[derive(Debug, Clone, Deserialize)]
pub struct FacebookUser {
    pub id: String,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<FacebookPicture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FacebookPicture {
    pub data: FacebookPictureData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FacebookPictureData {
    pub url: Option<String>,
}

/// Provider-neutral profile handed to the login flow.
///
/// `emails` and `photos` may be empty when the user declined to share
/// them or has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub external_id: String,
    pub display_name: String,
    pub emails: Vec<String>,
    pub photos: Vec<String>,
}

impl From<FacebookUser> for ProviderProfile {
    fn from(user: FacebookUser) -> Self {
        let display_name = user
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| {
                [user.first_name.as_deref(), user.last_name.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ")
            });

        Self {
            external_id: user.id,
            display_name,
            emails: user.email.into_iter().collect(),
            photos: user
                .picture
                .and_then(|picture| picture.data.url)
                .into_iter()
                .collect(),
        }
    }
}
