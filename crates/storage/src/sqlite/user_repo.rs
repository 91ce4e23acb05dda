use async_trait::async_trait;
use lesson_core::model::{Email, User, UserId};

use crate::repository::{NewUserRecord, StorageError, UserRepository};

use super::SqliteRepository;
use super::mapping::{map_user_row, user_id_from_i64};

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn create_user(&self, record: NewUserRecord) -> Result<UserId, StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO users (email, password_hash, created_at)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(record.email.as_str())
        .bind(record.password_hash)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                StorageError::Conflict
            } else {
                StorageError::Connection(err.to_string())
            }
        })?;

        user_id_from_i64(result.last_insert_rowid())
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = ?1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn update_password_hash(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<(), StorageError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET password_hash = ?1
            WHERE email = ?2
            ",
        )
        .bind(password_hash)
        .bind(email.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
