use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lesson_core::model::{Email, LessonContent, User, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Insert shape for a user; the repository assigns the ID.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub email: Email,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Repository contract for registered users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return the assigned ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the email is already registered.
    async fn create_user(&self, record: NewUserRecord) -> Result<UserId, StorageError>;

    /// Fetch a user by email.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures; a missing user is `Ok(None)`.
    async fn get_user_by_email(&self, email: &Email) -> Result<Option<User>, StorageError>;

    /// Replace the password hash of an existing user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no user has this email.
    async fn update_password_hash(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<(), StorageError>;
}

/// Pending password-reset tokens, one per email.
#[async_trait]
pub trait ResetTokenRepository: Send + Sync {
    /// Store a token, replacing any earlier one for the same email.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn save_reset_token(&self, email: &Email, token: String) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_reset_token(&self, email: &Email) -> Result<Option<String>, StorageError>;

    /// Remove the token for an email. Missing tokens are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_reset_token(&self, email: &Email) -> Result<(), StorageError>;
}

/// Extracted upload text keyed by user identity.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store content for a user, replacing the previous upload.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn put_content(&self, email: &Email, content: LessonContent) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures; no upload is `Ok(None)`.
    async fn get_content(&self, email: &Email) -> Result<Option<LessonContent>, StorageError>;
}

#[derive(Default)]
struct UserTable {
    next_id: u64,
    by_email: HashMap<Email, User>,
}

/// In-memory implementation of every repository, for tests and for state the
/// server never persists (reset tokens, uploaded content).
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<Mutex<UserTable>>,
    reset_tokens: Arc<Mutex<HashMap<Email, String>>>,
    contents: Arc<Mutex<HashMap<Email, LessonContent>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn create_user(&self, record: NewUserRecord) -> Result<UserId, StorageError> {
        let mut table = lock(&self.users)?;
        if table.by_email.contains_key(&record.email) {
            return Err(StorageError::Conflict);
        }
        table.next_id += 1;
        let id = UserId::new(table.next_id);
        let user = User::from_persisted(
            id,
            record.email.clone(),
            record.password_hash,
            record.created_at,
        );
        table.by_email.insert(record.email, user);
        Ok(id)
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<Option<User>, StorageError> {
        let table = lock(&self.users)?;
        Ok(table.by_email.get(email).cloned())
    }

    async fn update_password_hash(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<(), StorageError> {
        let mut table = lock(&self.users)?;
        let user = table.by_email.get_mut(email).ok_or(StorageError::NotFound)?;
        *user = user.with_password_hash(password_hash.to_owned());
        Ok(())
    }
}

#[async_trait]
impl ResetTokenRepository for InMemoryRepository {
    async fn save_reset_token(&self, email: &Email, token: String) -> Result<(), StorageError> {
        lock(&self.reset_tokens)?.insert(email.clone(), token);
        Ok(())
    }

    async fn get_reset_token(&self, email: &Email) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.reset_tokens)?.get(email).cloned())
    }

    async fn delete_reset_token(&self, email: &Email) -> Result<(), StorageError> {
        lock(&self.reset_tokens)?.remove(email);
        Ok(())
    }
}

#[async_trait]
impl ContentStore for InMemoryRepository {
    async fn put_content(&self, email: &Email, content: LessonContent) -> Result<(), StorageError> {
        lock(&self.contents)?.insert(email.clone(), content);
        Ok(())
    }

    async fn get_content(&self, email: &Email) -> Result<Option<LessonContent>, StorageError> {
        Ok(lock(&self.contents)?.get(email).cloned())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub reset_tokens: Arc<dyn ResetTokenRepository>,
    pub contents: Arc<dyn ContentStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let users: Arc<dyn UserRepository> = Arc::new(repo.clone());
        let reset_tokens: Arc<dyn ResetTokenRepository> = Arc::new(repo.clone());
        let contents: Arc<dyn ContentStore> = Arc::new(repo);
        Self {
            users,
            reset_tokens,
            contents,
        }
    }
}
