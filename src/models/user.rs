//! Registered user account

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored account record
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub email: String,
    pub first_name: String,
    /// `sha256$<salt>$<hex digest>`
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Account about to be stored; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub password_hash: String,
}

impl User {
    /// Normalized lookup key for an email address
    #[must_use]
    pub fn key_for(email: &str) -> String {
        email.trim().to_lowercase()
    }
}

impl From<NewUser> for User {
    fn from(new_user: NewUser) -> Self {
        Self {
            email: new_user.email,
            first_name: new_user.first_name,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        }
    }
}
