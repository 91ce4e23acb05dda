use chrono::{DateTime, Utc};

use crate::model::{Email, UserId};

/// A registered account. The password hash is opaque to the domain layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: Email,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn from_persisted(
        id: UserId,
        email: Email,
        password_hash: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn email(&self) -> &Email {
        &self.email
    }

    #[must_use]
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns a copy carrying a new password hash.
    #[must_use]
    pub fn with_password_hash(&self, password_hash: String) -> Self {
        Self {
            password_hash,
            ..self.clone()
        }
    }
}
