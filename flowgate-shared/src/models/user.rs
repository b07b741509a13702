/// Identity user
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id VARCHAR(64) PRIMARY KEY,
///     first_name VARCHAR(255),
///     last_name VARCHAR(255),
///     email VARCHAR(255),
///     password_hash VARCHAR(255),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Unlike most rows in the system the id is chosen by the caller, so there is
/// no generated key and creating a user with an existing id is a conflict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account known to the identity service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Caller-supplied id (unique, at most 64 characters)
    pub id: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    pub email: Option<String>,

    /// Argon2id hash of the password, if one was set
    ///
    /// Never serialized back to API clients.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Builds an unsaved user carrying only its id
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            first_name: None,
            last_name: None,
            email: None,
            password_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the non-None fields of `changes`; the password is handled by
    /// the identity service because it has to be hashed first
    pub fn apply(&mut self, changes: UpdateUser) {
        if let Some(first_name) = changes.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            self.last_name = last_name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial update of a user
///
/// `Some(None)` clears a field, `None` leaves it untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub first_name: Option<Option<String>>,

    pub last_name: Option<Option<String>>,

    pub email: Option<Option<String>>,

    /// New plaintext password
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_has_only_id() {
        let user = User::new("kermit");
        assert_eq!(user.id, "kermit");
        assert!(user.first_name.is_none());
        assert!(user.email.is_none());
        assert!(user.password_hash.is_none());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_apply_update() {
        let mut user = User::new("kermit");
        user.first_name = Some("Kermit".to_string());
        user.last_name = Some("Frog".to_string());

        user.apply(UpdateUser {
            first_name: Some(None),
            email: Some(Some("kermit@muppets.com".to_string())),
            ..Default::default()
        });

        assert!(user.first_name.is_none());
        assert_eq!(user.last_name.as_deref(), Some("Frog"));
        assert_eq!(user.email.as_deref(), Some("kermit@muppets.com"));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let mut user = User::new("kermit");
        user.password_hash = Some("$argon2id$secret".to_string());

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["id"], "kermit");
    }
}
