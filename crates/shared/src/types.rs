//! Common types used across Toolgate

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// ID Wrappers
// =============================================================================

/// User ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

// =============================================================================
// User Model
// =============================================================================

/// Optional profile fields attached to an account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UserProfile {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Stored account record.
///
/// Carries the Argon2 password hash, so it deliberately has no `Serialize`
/// impl. Use [`User::view`] for anything leaving the process.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    /// Case-sensitive and immutable once created
    pub username: String,
    pub password_hash: String,
    pub profile: UserProfile,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Build a fresh active record with the given (already hashed) secret
    pub fn new(username: impl Into<String>, password_hash: String, profile: UserProfile) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: UserId::new(),
            username: username.into(),
            password_hash,
            profile,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Public projection of the record
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id.0,
            username: self.username.clone(),
            profile: self.profile.clone(),
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Public view of an account, never includes the password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    #[schemars(with = "String")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schemars(with = "String")]
    pub updated_at: OffsetDateTime,
}

/// Partial change to the caller's own account.
///
/// Fields left as `None` keep their current value. A new password is always
/// re-hashed before it reaches storage.
#[derive(Clone, Default, Deserialize, JsonSchema)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.display_name.is_none() && self.password.is_none()
    }
}

impl fmt::Debug for ProfileUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileUpdate")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
