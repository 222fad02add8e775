// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-side login sessions.
//!
//! A session maps an opaque token to a user's internal ID. The token is
//! what the browser holds (inside a signed cookie, see
//! `middleware::auth`); everything else stays in the store.

use crate::db::Database;
use crate::error::AppError;
use crate::models::{Session, User};
use crate::time_utils::format_utc_rfc3339;
use crate::tokens::{random_token, TOKEN_BYTES};
use chrono::{Duration, Utc};

/// Starts, resolves and ends sessions.
#[derive(Clone)]
pub struct SessionManager {
    db: Database,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(db: Database, ttl: Duration) -> Self {
        Self { db, ttl }
    }

    /// Start a session for `user_id` and return its token.
    pub async fn start(&self, user_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let session = Session {
            token: random_token(TOKEN_BYTES)?,
            user_id: user_id.to_string(),
            created_at: format_utc_rfc3339(now),
            expires_at: format_utc_rfc3339(now + self.ttl),
        };

        self.db.create_session(&session).await?;
        tracing::debug!(user_id, "Session started");

        Ok(session.token)
    }

    /// Resolve a token to its user.
    ///
    /// Returns `None` for unknown or expired tokens, for sessions whose
    /// user no longer exists, and when the store cannot be reached.
    pub async fn resolve(&self, token: &str) -> Option<User> {
        let session = match self.db.get_session(token).await {
            Ok(Some(session)) => session,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed, treating as anonymous");
                return None;
            }
        };

        if session.is_expired_at(Utc::now()) {
            tracing::debug!(user_id = %session.user_id, "Session expired");
            if let Err(e) = self.db.delete_session(token).await {
                tracing::warn!(error = %e, "Failed to delete expired session");
            }
            return None;
        }

        match self.db.find_user_by_id(&session.user_id).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                tracing::warn!(user_id = %session.user_id, "Session refers to missing user");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "User lookup failed, treating as anonymous");
                None
            }
        }
    }

    /// End a session. Unknown tokens are ignored.
    pub async fn end(&self, token: &str) -> Result<(), AppError> {
        self.db.delete_session(token).await
    }
}
