//! User model for storage and rendering.

use serde::{Deserialize, Serialize};

/// User profile stored in the `users` collection.
///
/// Documents are keyed by `facebook_id`, which is what makes the
/// one-record-per-Facebook-account rule hold under concurrent logins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Internal ID (server generated, referenced by sessions)
    pub id: String,
    /// Facebook user ID
    pub facebook_id: String,
    /// Display name
    pub name: String,
    /// Email address (None if the user did not share one)
    pub email: Option<String>,
    /// Profile picture URL
    pub photo: Option<String>,
    /// When the user first logged in (RFC 3339)
    pub created_at: String,
}
