use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use lesson_core::model::{Email, UserId};
use storage::repository::{NewUserRecord, ResetTokenRepository, StorageError, UserRepository};

use crate::Clock;
use crate::error::AuthError;
use crate::password::{
    DEFAULT_HASH_COST, hash_password, random_token, secrets_match, verify_password,
};

/// Account seeded on startup so a fresh install can be tried immediately.
pub const DEMO_EMAIL: &str = "user@example.com";
pub const DEMO_PASSWORD: &str = "password123";

const RESET_TOKEN_LEN: usize = 43;
const DEFAULT_SECRET: &str = "fallback-secret-key-change-in-production";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub secret_key: String,
    pub token_ttl: Duration,
    /// bcrypt work factor for new password hashes.
    pub hash_cost: u32,
}

impl AuthConfig {
    #[must_use]
    pub fn new(secret_key: impl Into<String>, token_ttl: Duration) -> Self {
        Self {
            secret_key: secret_key.into(),
            token_ttl,
            hash_cost: DEFAULT_HASH_COST,
        }
    }

    #[must_use]
    pub fn with_hash_cost(mut self, hash_cost: u32) -> Self {
        self.hash_cost = hash_cost;
        self
    }

    /// True when the signing secret is the built-in development value.
    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SECRET, Duration::minutes(30))
    }
}

/// Bearer token handed to clients after login.
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Identity resolved from a valid bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: Email,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Registration, login and password resets over injected repositories.
#[derive(Clone)]
pub struct AuthService {
    clock: Clock,
    config: AuthConfig,
    users: Arc<dyn UserRepository>,
    reset_tokens: Arc<dyn ResetTokenRepository>,
}

impl AuthService {
    #[must_use]
    pub fn new(
        clock: Clock,
        config: AuthConfig,
        users: Arc<dyn UserRepository>,
        reset_tokens: Arc<dyn ResetTokenRepository>,
    ) -> Self {
        Self {
            clock,
            config,
            users,
            reset_tokens,
        }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Email` for malformed addresses,
    /// `AuthError::EmptyPassword` for blank passwords and
    /// `AuthError::EmailTaken` when the address is already registered.
    pub async fn register(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }
        if self.users.get_user_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.hash(password).await?;
        let user_id = self
            .users
            .create_user(NewUserRecord {
                email: email.clone(),
                password_hash,
                created_at: self.clock.now(),
            })
            .await
            .map_err(|err| match err {
                StorageError::Conflict => AuthError::EmailTaken,
                other => AuthError::Storage(other),
            })?;

        tracing::info!(%email, %user_id, "user registered");
        Ok(user_id)
    }

    /// Check credentials and issue a signed access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for unknown users, malformed
    /// emails or wrong passwords.
    pub async fn login(&self, email: &str, password: &str) -> Result<AccessToken, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;
        let user = self
            .users
            .get_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        let password = password.to_owned();
        let stored = user.password_hash().to_owned();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|err| AuthError::Hashing(err.to_string()))?;
        if !matches {
            tracing::info!(%email, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.issue_token(&email)?;
        Ok(AccessToken {
            access_token,
            token_type: "bearer",
        })
    }

    /// bcrypt is CPU-bound, so hashing runs on the blocking pool.
    async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_owned();
        let cost = self.config.hash_cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|err| AuthError::Hashing(err.to_string()))?
            .map_err(|err| AuthError::Hashing(err.to_string()))
    }

    fn issue_token(&self, email: &Email) -> Result<String, AuthError> {
        let now = self.clock.now();
        let claims = Claims {
            sub: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.config.token_ttl).timestamp(),
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret_key.as_bytes()),
        )
        .map_err(AuthError::Signing)
    }

    /// Resolve a bearer token to an existing user.
    ///
    /// Expiry is checked against the service clock.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for bad signatures, malformed or
    /// expired tokens, and `AuthError::UserNotFound` when the subject no longer
    /// exists.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret_key.as_bytes()),
            &validation,
        )
        .map_err(|err| {
            tracing::debug!(error = %err, "rejected bearer token");
            AuthError::InvalidToken
        })?;

        if data.claims.exp <= self.clock.now().timestamp() {
            return Err(AuthError::InvalidToken);
        }
        let email = Email::parse(&data.claims.sub).map_err(|_| AuthError::InvalidToken)?;
        let user = self
            .users
            .get_user_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(AuthenticatedUser {
            user_id: user.id(),
            email,
        })
    }

    /// Start a password reset. Unknown or malformed emails are ignored so the
    /// response never reveals whether an account exists.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` on repository failures.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(());
        };
        if self.users.get_user_by_email(&email).await?.is_none() {
            return Ok(());
        }

        let token = random_token(RESET_TOKEN_LEN);
        self.reset_tokens
            .save_reset_token(&email, token.clone())
            .await?;
        // Delivery is a log line until a mail transport exists.
        tracing::info!(%email, %token, "sending password reset email");
        Ok(())
    }

    /// Complete a password reset with the token from `forgot_password`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidResetToken` when the email or token does not
    /// match a pending reset, and `AuthError::EmptyPassword` for a blank
    /// replacement.
    pub async fn reset_password(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidResetToken)?;
        if new_password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }
        let stored = self.reset_tokens.get_reset_token(&email).await?;
        if !stored.is_some_and(|stored| secrets_match(&stored, token)) {
            return Err(AuthError::InvalidResetToken);
        }

        let password_hash = self.hash(new_password).await?;
        self.users
            .update_password_hash(&email, &password_hash)
            .await
            .map_err(|err| match err {
                StorageError::NotFound => AuthError::InvalidResetToken,
                other => AuthError::Storage(other),
            })?;
        self.reset_tokens.delete_reset_token(&email).await?;
        tracing::info!(%email, "password reset");
        Ok(())
    }

    /// Seed the demo account if it does not exist. Returns whether it was created.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` on repository failures.
    pub async fn ensure_demo_user(&self) -> Result<bool, AuthError> {
        match self.register(DEMO_EMAIL, DEMO_PASSWORD).await {
            Ok(_) => Ok(true),
            Err(AuthError::EmailTaken) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::time::fixed_clock;
    use storage::repository::Storage;

    use crate::password::MIN_HASH_COST;

    fn test_config() -> AuthConfig {
        AuthConfig::default().with_hash_cost(MIN_HASH_COST)
    }

    fn service_with(clock: Clock) -> (AuthService, Storage) {
        let storage = Storage::in_memory();
        let service = AuthService::new(
            clock,
            test_config(),
            Arc::clone(&storage.users),
            Arc::clone(&storage.reset_tokens),
        );
        (service, storage)
    }

    fn service() -> AuthService {
        service_with(fixed_clock()).0
    }

    #[tokio::test]
    async fn register_then_login_then_authenticate() {
        let auth = service();
        let id = auth.register("Student@Example.com", "secret").await.unwrap();

        let token = auth.login("student@example.com", "secret").await.unwrap();
        assert_eq!(token.token_type, "bearer");

        let user = auth.authenticate(&token.access_token).await.unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.email.as_str(), "student@example.com");
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let auth = service();
        auth.register("a@example.com", "x").await.unwrap();
        let err = auth.register("a@example.com", "y").await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn invalid_registration_input_is_rejected() {
        let auth = service();
        assert!(matches!(
            auth.register("nope", "x").await.unwrap_err(),
            AuthError::Email(_)
        ));
        assert!(matches!(
            auth.register("a@example.com", "").await.unwrap_err(),
            AuthError::EmptyPassword
        ));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_fail_alike() {
        let auth = service();
        auth.register("a@example.com", "right").await.unwrap();
        assert!(matches!(
            auth.login("a@example.com", "wrong").await.unwrap_err(),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            auth.login("b@example.com", "right").await.unwrap_err(),
            AuthError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let storage = Storage::in_memory();
        let issuing = AuthService::new(
            fixed_clock(),
            test_config(),
            Arc::clone(&storage.users),
            Arc::clone(&storage.reset_tokens),
        );
        issuing.register("a@example.com", "pw").await.unwrap();
        let token = issuing.login("a@example.com", "pw").await.unwrap();

        let mut later = fixed_clock();
        later.advance(Duration::minutes(31));
        let checking = AuthService::new(
            later,
            test_config(),
            Arc::clone(&storage.users),
            Arc::clone(&storage.reset_tokens),
        );
        assert!(matches!(
            checking.authenticate(&token.access_token).await.unwrap_err(),
            AuthError::InvalidToken
        ));
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let (auth, storage) = service_with(fixed_clock());
        auth.register("a@example.com", "pw").await.unwrap();
        let token = auth.login("a@example.com", "pw").await.unwrap();

        let other = AuthService::new(
            fixed_clock(),
            AuthConfig::new("another-secret", Duration::minutes(30)).with_hash_cost(MIN_HASH_COST),
            Arc::clone(&storage.users),
            Arc::clone(&storage.reset_tokens),
        );
        assert!(matches!(
            other.authenticate(&token.access_token).await.unwrap_err(),
            AuthError::InvalidToken
        ));
        assert!(matches!(
            auth.authenticate("not.a.jwt").await.unwrap_err(),
            AuthError::InvalidToken
        ));
    }

    #[tokio::test]
    async fn token_for_missing_user_is_user_not_found() {
        let (auth, _storage) = service_with(fixed_clock());
        let token = auth
            .issue_token(&Email::parse("ghost@example.com").unwrap())
            .unwrap();
        assert!(matches!(
            auth.authenticate(&token).await.unwrap_err(),
            AuthError::UserNotFound
        ));
    }

    #[tokio::test]
    async fn password_reset_flow() {
        let (auth, storage) = service_with(fixed_clock());
        auth.register("a@example.com", "old").await.unwrap();
        auth.forgot_password("a@example.com").await.unwrap();

        let email = Email::parse("a@example.com").unwrap();
        let token = storage
            .reset_tokens
            .get_reset_token(&email)
            .await
            .unwrap()
            .expect("token stored");
        assert_eq!(token.len(), RESET_TOKEN_LEN);

        assert!(matches!(
            auth.reset_password("a@example.com", "wrong", "new").await.unwrap_err(),
            AuthError::InvalidResetToken
        ));
        let mut near_miss = token.clone();
        let last = near_miss.pop().map_or('x', |c| if c == 'x' { 'y' } else { 'x' });
        near_miss.push(last);
        assert!(matches!(
            auth.reset_password("a@example.com", &near_miss, "new").await.unwrap_err(),
            AuthError::InvalidResetToken
        ));
        auth.reset_password("a@example.com", &token, "new").await.unwrap();
        assert!(auth.login("a@example.com", "new").await.is_ok());
        assert!(auth.login("a@example.com", "old").await.is_err());

        // Tokens are single use.
        assert!(matches!(
            auth.reset_password("a@example.com", &token, "again").await.unwrap_err(),
            AuthError::InvalidResetToken
        ));
    }

    #[tokio::test]
    async fn forgot_password_for_unknown_email_is_silent() {
        let (auth, storage) = service_with(fixed_clock());
        auth.forgot_password("nobody@example.com").await.unwrap();
        auth.forgot_password("garbage").await.unwrap();
        let email = Email::parse("nobody@example.com").unwrap();
        assert!(storage.reset_tokens.get_reset_token(&email).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stored_passwords_are_bcrypt_hashes() {
        let (auth, storage) = service_with(fixed_clock());
        auth.register("a@example.com", "pw").await.unwrap();
        let user = storage
            .users
            .get_user_by_email(&Email::parse("a@example.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(user.password_hash().starts_with("$2"));
        assert_ne!(user.password_hash(), "pw");
        assert!(verify_password("pw", user.password_hash()));
    }

    #[tokio::test]
    async fn out_of_range_hash_cost_fails_registration() {
        let storage = Storage::in_memory();
        let auth = AuthService::new(
            fixed_clock(),
            AuthConfig::default().with_hash_cost(MIN_HASH_COST - 1),
            Arc::clone(&storage.users),
            Arc::clone(&storage.reset_tokens),
        );
        assert!(matches!(
            auth.register("a@example.com", "pw").await.unwrap_err(),
            AuthError::Hashing(_)
        ));
    }

    #[tokio::test]
    async fn demo_user_is_seeded_once() {
        let auth = service();
        assert!(auth.ensure_demo_user().await.unwrap());
        assert!(!auth.ensure_demo_user().await.unwrap());
        assert!(auth.login(DEMO_EMAIL, DEMO_PASSWORD).await.is_ok());
    }
}
