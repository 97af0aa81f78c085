//! Database operations for `users`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use vitrine_core::LoginCandidate;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    /// Already-encoded PHC string.
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct CandidateRow {
    id: i64,
    email: String,
    username: String,
    password_hash: String,
    is_active: bool,
}

/// Accounts whose email (case-insensitive) or non-empty username equals
/// `identifier`. Choosing among them is left to
/// [`vitrine_core::pick_login_candidate`].
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn find_login_candidates(
    pool: &PgPool,
    identifier: &str,
) -> Result<Vec<LoginCandidate>, DbError> {
    let rows = sqlx::query_as::<_, CandidateRow>(
        "SELECT id, email, username, password_hash, is_active FROM users \
         WHERE LOWER(email) = LOWER($1) OR (username <> '' AND username = $1) \
         ORDER BY id",
    )
    .bind(identifier)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| LoginCandidate {
            user_id: row.id,
            email: row.email,
            username: row.username,
            password_hash: row.password_hash,
            is_active: row.is_active,
        })
        .collect())
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails; an email already registered
/// (case-insensitively) is a unique violation.
pub async fn create_user(pool: &PgPool, user: &NewUser) -> Result<UserRow, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (email, username, password_hash, first_name, last_name) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, email, username, first_name, last_name, is_active, date_joined, last_login",
    )
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn get_user(pool: &PgPool, id: i64) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, username, first_name, last_name, is_active, date_joined, last_login \
         FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Stamps `last_login` with the current time.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn record_login(pool: &PgPool, id: i64) -> Result<(), DbError> {
    sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
