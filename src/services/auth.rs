// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login completion: find or create the user, then start a session.

use crate::db::Database;
use crate::error::AppError;
use crate::models::User;
use crate::services::facebook::ProviderProfile;
use crate::services::session::SessionManager;
use crate::time_utils::format_utc_rfc3339;
use crate::tokens::random_id;

/// Result of a completed login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub session_token: String,
    /// Whether this login created the user record
    pub created: bool,
}

/// Turns a verified provider profile into a logged-in user.
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    sessions: SessionManager,
}

impl AuthService {
    pub fn new(db: Database, sessions: SessionManager) -> Self {
        Self { db, sessions }
    }

    /// Find or create the user for `profile` and start a session.
    ///
    /// Existing users are returned as stored; name, email and photo are
    /// not refreshed from the provider. If the store fails no user record
    /// is created and no usable session is started.
    pub async fn complete_login(
        &self,
        profile: ProviderProfile,
    ) -> Result<LoginOutcome, AppError> {
        if profile.external_id.trim().is_empty() {
            return Err(AppError::Provider("Profile is missing a user ID".to_string()));
        }

        let existing = self
            .db
            .find_user_by_facebook_id(&profile.external_id)
            .await?;

        let outcome = match existing {
            Some(user) => {
                let session_token = self.sessions.start(&user.id).await?;
                LoginOutcome {
                    user,
                    session_token,
                    created: false,
                }
            }
            None => self.create_user_and_session(&profile).await?,
        };

        tracing::info!(user_id = %outcome.user.id, created = outcome.created, "Login complete");

        Ok(outcome)
    }

    /// First login for this account as far as we know.
    ///
    /// The session is written before the user record. A session whose
    /// user was never stored resolves to nobody, so a failure at either
    /// step leaves no user behind.
    async fn create_user_and_session(
        &self,
        profile: &ProviderProfile,
    ) -> Result<LoginOutcome, AppError> {
        let candidate = new_user(profile)?;
        let session_token = self.sessions.start(&candidate.id).await?;

        match self.db.create_user_if_absent(&candidate).await {
            Ok((user, true)) => {
                tracing::info!(user_id = %user.id, facebook_id = %user.facebook_id, "Created user");
                Ok(LoginOutcome {
                    user,
                    session_token,
                    created: true,
                })
            }
            Ok((user, false)) => {
                // Another login created the user first.
                self.discard_session(&session_token).await;
                let session_token = self.sessions.start(&user.id).await?;
                Ok(LoginOutcome {
                    user,
                    session_token,
                    created: false,
                })
            }
            Err(e) => {
                self.discard_session(&session_token).await;
                Err(e)
            }
        }
    }

    async fn discard_session(&self, token: &str) {
        if let Err(e) = self.sessions.end(token).await {
            tracing::warn!(error = %e, "Failed to discard unused session");
        }
    }
}

/// Build the record for a first-time login.
fn new_user(profile: &ProviderProfile) -> Result<User, AppError> {
    Ok(User {
        id: random_id()?,
        facebook_id: profile.external_id.clone(),
        name: profile.display_name.clone(),
        email: profile.emails.first().cloned(),
        photo: profile.photos.first().cloned(),
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    })
}
