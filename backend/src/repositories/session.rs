//! Session repository: one revocable row per issued token.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::session::Session;

/// Inserts a session row. The token fingerprint is the natural key; a
/// collision is cryptographically implausible and propagates as an error.
pub async fn insert_session(pool: &PgPool, session: &Session) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO sessions \
            (token_hash, account_id, expires_at, is_remembered, created_at, user_agent) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&session.token_hash)
    .bind(&session.account_id)
    .bind(session.expires_at)
    .bind(session.is_remembered)
    .bind(session.created_at)
    .bind(&session.user_agent)
    .execute(pool)
    .await
    .map(|_| ())
}

/// Finds a session by its token fingerprint.
pub async fn find_session_by_token_hash(
    pool: &PgPool,
    token_hash: &str,
) -> Result<Option<Session>, sqlx::Error> {
    sqlx::query_as::<_, Session>(
        "SELECT token_hash, account_id, expires_at, is_remembered, created_at, user_agent \
         FROM sessions WHERE token_hash = $1",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await
}

/// Deletes a session by its token fingerprint. Idempotent: deleting an
/// absent row is not an error.
pub async fn delete_session_by_token_hash(
    pool: &PgPool,
    token_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
        .bind(token_hash)
        .execute(pool)
        .await
        .map(|_| ())
}

/// Removes every session whose deadline is at or before `now`. Returns the
/// number of deleted rows.
///
/// Invoked by the cleanup binary on a schedule, never by request-path code;
/// safe to run concurrently with live traffic.
pub async fn cleanup_expired_sessions(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
