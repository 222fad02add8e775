//! Login session model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side session stored in the `sessions` collection, keyed by token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session token (also used as document ID)
    pub token: String,
    /// Internal ID of the logged-in user
    pub user_id: String,
    /// When the session was started (RFC 3339)
    pub created_at: String,
    /// When the session stops resolving (RFC 3339)
    pub expires_at: String,
}

impl Session {
    /// Check whether the session has expired at `now`.
    ///
    /// An unparseable expiry counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match DateTime::parse_from_rfc3339(&self.expires_at) {
            Ok(expires_at) => expires_at.with_timezone(&Utc) <= now,
            Err(_) => true,
        }
    }
}
