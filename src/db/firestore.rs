// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage, keyed by Facebook ID)
//! - Sessions (login sessions, keyed by token)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Session, User};
use firestore::errors::FirestoreError;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their Facebook ID.
    pub async fn get_user_by_facebook_id(
        &self,
        facebook_id: &str,
    ) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&user_document_id(facebook_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user by internal ID.
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let id = id.to_string();
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field("id").eq(id.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// Create a user unless one with the same Facebook ID already exists.
    ///
    /// The document ID is derived from the Facebook ID and Firestore's
    /// `insert` refuses to overwrite, so concurrent first logins race on
    /// the server and exactly one of them creates the document.
    pub async fn create_user_if_absent(&self, user: &User) -> Result<(User, bool), AppError> {
        let inserted: Result<User, FirestoreError> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(user_document_id(&user.facebook_id))
            .object(user)
            .execute()
            .await;

        match inserted {
            Ok(created) => Ok((created, true)),
            Err(FirestoreError::DataConflictError(_)) => {
                tracing::debug!(
                    facebook_id = %user.facebook_id,
                    "User created concurrently, using existing record"
                );
                let existing = self
                    .get_user_by_facebook_id(&user.facebook_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Database(format!(
                            "User {} conflicted on insert but could not be read",
                            user.facebook_id
                        ))
                    })?;
                Ok((existing, false))
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    // ─── Session Operations ──────────────────────────────────────

    /// Store a new session.
    pub async fn create_session(&self, session: &Session) -> Result<(), AppError> {
        let _: Session = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::SESSIONS)
            .document_id(&session.token)
            .object(session)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a session by token.
    pub async fn get_session(&self, token: &str) -> Result<Option<Session>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SESSIONS)
            .obj()
            .one(token)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a session (logout or expiry).
    pub async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::SESSIONS)
            .document_id(token)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

/// Firestore document IDs may not contain `/`, so encode the Facebook ID.
fn user_document_id(facebook_id: &str) -> String {
    urlencoding::encode(facebook_id).into_owned()
}
