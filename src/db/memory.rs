//! In-process store used with `DB_URI=memory://` and in tests.

use crate::error::AppError;
use crate::models::{Session, User};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-local user and session store.
///
/// Cloning is cheap and clones share the same maps.
#[derive(Clone, Default)]
pub struct MemoryDb {
    /// Users keyed by Facebook ID
    users: Arc<DashMap<String, User>>,
    /// Internal ID -> Facebook ID
    user_ids: Arc<DashMap<String, String>>,
    /// Sessions keyed by token
    sessions: Arc<DashMap<String, Session>>,
    /// When set, session writes are rejected
    reject_session_writes: Arc<AtomicBool>,
}

impl MemoryDb {
    pub fn get_user_by_facebook_id(&self, facebook_id: &str) -> Option<User> {
        self.users.get(facebook_id).map(|user| user.clone())
    }

    pub fn get_user_by_id(&self, id: &str) -> Option<User> {
        let facebook_id = self.user_ids.get(id)?.clone();
        self.get_user_by_facebook_id(&facebook_id)
    }

    /// Insert under the shard lock for the Facebook ID, so check and
    /// insert cannot interleave with another login for the same account.
    pub fn create_user_if_absent(&self, user: &User) -> (User, bool) {
        match self.users.entry(user.facebook_id.clone()) {
            Entry::Occupied(existing) => (existing.get().clone(), false),
            Entry::Vacant(slot) => {
                self.user_ids
                    .insert(user.id.clone(), user.facebook_id.clone());
                slot.insert(user.clone());
                (user.clone(), true)
            }
        }
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn create_session(&self, session: &Session) -> Result<(), AppError> {
        if self.reject_session_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(
                "Session writes are unavailable".to_string(),
            ));
        }
        self.sessions.insert(session.token.clone(), session.clone());
        Ok(())
    }

    /// Make later session writes fail (or succeed again), as when the
    /// sessions collection is unavailable while users are not.
    pub fn reject_session_writes(&self, reject: bool) {
        self.reject_session_writes.store(reject, Ordering::SeqCst);
    }

    pub fn get_session(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).map(|session| session.clone())
    }

    pub fn delete_session(&self, token: &str) {
        self.sessions.remove(token);
    }

    /// Number of live (not yet deleted) sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
