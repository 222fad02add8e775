// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything the login flow needs is validated here so that a bad
//! deployment fails at startup instead of on the first request.

use std::env;

/// Minimum length of the session secret, in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// Default session lifetime (14 days).
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 14 * 24;

/// Where user records and sessions live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUri {
    /// `firestore://<project-id>`
    Firestore { project_id: String },
    /// `memory://` - process-local store for development and tests.
    Memory,
}

impl DatabaseUri {
    /// Parse a `DB_URI` value.
    pub fn parse(uri: &str) -> Result<Self, ConfigError> {
        let uri = uri.trim();
        if let Some(project_id) = uri.strip_prefix("firestore://") {
            let project_id = project_id.trim_end_matches('/');
            if project_id.is_empty() || project_id.contains('/') {
                return Err(ConfigError::Invalid(
                    "DB_URI",
                    "firestore URI must name exactly one project".to_string(),
                ));
            }
            return Ok(Self::Firestore {
                project_id: project_id.to_string(),
            });
        }
        if uri == "memory://" || uri == "memory:" {
            return Ok(Self::Memory);
        }
        Err(ConfigError::Invalid(
            "DB_URI",
            format!("unsupported database URI scheme: {uri}"),
        ))
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Facebook app ID (public)
    pub facebook_app_id: String,
    /// Facebook app secret
    pub facebook_app_secret: String,
    /// Absolute URL Facebook redirects back to after consent
    pub facebook_callback_url: String,
    /// Database location
    pub database: DatabaseUri,
    /// Server port
    pub port: u16,
    /// Key for signing session cookies and OAuth state (raw bytes)
    pub session_secret: Vec<u8>,
    /// How long a session stays valid after login
    pub session_ttl: chrono::Duration,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            facebook_app_id: "test_app_id".to_string(),
            facebook_app_secret: "test_app_secret".to_string(),
            facebook_callback_url: "http://localhost:3000/auth/callback".to_string(),
            database: DatabaseUri::Memory,
            port: 3000,
            session_secret: b"test_session_secret_32_bytes_min!".to_vec(),
            session_ttl: chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local
    /// development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let session_secret = required("SESSION_SECRET")?.into_bytes();
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::Invalid(
                "SESSION_SECRET",
                format!("must be at least {MIN_SESSION_SECRET_LEN} bytes"),
            ));
        }

        let facebook_callback_url = required("FACEBOOK_CALLBACK_URL")?;
        if !(facebook_callback_url.starts_with("http://")
            || facebook_callback_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(
                "FACEBOOK_CALLBACK_URL",
                "must be an absolute http(s) URL".to_string(),
            ));
        }

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", format!("not a port number: {raw}")))?,
            None => 3000,
        };

        let session_ttl_hours = match lookup("SESSION_TTL_HOURS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|hours| *hours > 0)
                .ok_or_else(|| {
                    ConfigError::Invalid(
                        "SESSION_TTL_HOURS",
                        format!("not a positive number of hours: {raw}"),
                    )
                })?,
            None => DEFAULT_SESSION_TTL_HOURS,
        };

        Ok(Self {
            facebook_app_id: required("FACEBOOK_APP_ID")?,
            facebook_app_secret: required("FACEBOOK_APP_SECRET")?,
            facebook_callback_url,
            database: DatabaseUri::parse(&required("DB_URI")?)?,
            port,
            session_secret,
            session_ttl: chrono::Duration::hours(session_ttl_hours),
        })
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.facebook_callback_url.starts_with("https://")
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
