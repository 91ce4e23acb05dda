use lesson_core::model::{Email, User, UserId};
use sqlx::Row;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn user_id_from_i64(v: i64) -> Result<UserId, StorageError> {
    u64::try_from(v)
        .map(UserId::new)
        .map_err(|_| StorageError::Serialization("user_id sign overflow".into()))
}

pub(crate) fn map_user_row(row: &sqlx::sqlite::SqliteRow) -> Result<User, StorageError> {
    let id = user_id_from_i64(row.try_get("id").map_err(ser)?)?;
    let email = Email::parse(row.try_get::<String, _>("email").map_err(ser)?).map_err(ser)?;
    let password_hash: String = row.try_get("password_hash").map_err(ser)?;
    let created_at: chrono::DateTime<chrono::Utc> = row.try_get("created_at").map_err(ser)?;
    Ok(User::from_persisted(id, email, password_hash, created_at))
}
