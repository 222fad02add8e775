//! Database layer (Firestore, or an in-process store for development).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::config::DatabaseUri;
use crate::error::AppError;
use crate::models::{Session, User};

/// Collection names as constants.
pub mod collections {
    /// User profiles (keyed by Facebook ID)
    pub const USERS: &str = "users";
    /// Login sessions (keyed by session token)
    pub const SESSIONS: &str = "sessions";
}

/// Handle to whichever store `DB_URI` selected.
#[derive(Clone)]
pub struct Database {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Database {
    /// Connect to the store named by the configured URI.
    pub async fn connect(uri: &DatabaseUri) -> Result<Self, AppError> {
        match uri {
            DatabaseUri::Firestore { project_id } => {
                Ok(Self::from(FirestoreDb::new(project_id).await?))
            }
            DatabaseUri::Memory => {
                tracing::warn!("Using in-memory store; users and sessions are lost on restart");
                Ok(Self::in_memory())
            }
        }
    }

    /// Create an empty in-memory store.
    pub fn in_memory() -> Self {
        Self::from(MemoryDb::default())
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their Facebook ID.
    pub async fn find_user_by_facebook_id(
        &self,
        facebook_id: &str,
    ) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.get_user_by_facebook_id(facebook_id).await,
            Backend::Memory(db) => Ok(db.get_user_by_facebook_id(facebook_id)),
        }
    }

    /// Get a user by internal ID.
    pub async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.get_user_by_id(id).await,
            Backend::Memory(db) => Ok(db.get_user_by_id(id)),
        }
    }

    /// Insert `user` unless a user with the same Facebook ID exists.
    ///
    /// Returns the stored user and whether it was created by this call.
    /// The check and the insert are a single atomic step in both backends.
    pub async fn create_user_if_absent(&self, user: &User) -> Result<(User, bool), AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.create_user_if_absent(user).await,
            Backend::Memory(db) => Ok(db.create_user_if_absent(user)),
        }
    }

    // ─── Session Operations ──────────────────────────────────────

    /// Store a new session.
    pub async fn create_session(&self, session: &Session) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.create_session(session).await,
            Backend::Memory(db) => db.create_session(session),
        }
    }

    /// Get a session by token.
    pub async fn get_session(&self, token: &str) -> Result<Option<Session>, AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.get_session(token).await,
            Backend::Memory(db) => Ok(db.get_session(token)),
        }
    }

    /// Delete a session. Deleting an unknown token is not an error.
    pub async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.delete_session(token).await,
            Backend::Memory(db) => {
                db.delete_session(token);
                Ok(())
            }
        }
    }
}

impl From<FirestoreDb> for Database {
    fn from(db: FirestoreDb) -> Self {
        Self {
            backend: Backend::Firestore(db),
        }
    }
}

impl From<MemoryDb> for Database {
    fn from(db: MemoryDb) -> Self {
        Self {
            backend: Backend::Memory(db),
        }
    }
}
