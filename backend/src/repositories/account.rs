//! Account repository: maps hashed access keys to account rows.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::account::Account;

/// Inserts a new account row.
///
/// A duplicate `key_hash` surfaces as a database unique violation; the
/// service layer maps that to a conflict.
pub async fn create_account(pool: &PgPool, account: &Account) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO accounts \
            (id, key_hash, display_name, date_of_birth, gender, purpose, created_at, last_login_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(&account.id)
    .bind(&account.key_hash)
    .bind(&account.display_name)
    .bind(account.date_of_birth)
    .bind(&account.gender)
    .bind(&account.purpose)
    .bind(account.created_at)
    .bind(account.last_login_at)
    .execute(pool)
    .await
    .map(|_| ())
}

/// Finds an account by the hash of its access key.
pub async fn find_account_by_key_hash(
    pool: &PgPool,
    key_hash: &str,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "SELECT id, key_hash, display_name, date_of_birth, gender, purpose, created_at, last_login_at \
         FROM accounts WHERE key_hash = $1",
    )
    .bind(key_hash)
    .fetch_optional(pool)
    .await
}

/// Finds an account by its ID.
pub async fn find_account_by_id(
    pool: &PgPool,
    account_id: &str,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "SELECT id, key_hash, display_name, date_of_birth, gender, purpose, created_at, last_login_at \
         FROM accounts WHERE id = $1",
    )
    .bind(account_id)
    .fetch_optional(pool)
    .await
}

/// Stamps the most recent successful login.
pub async fn touch_last_login(
    pool: &PgPool,
    account_id: &str,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE accounts SET last_login_at = $1 WHERE id = $2")
        .bind(now)
        .bind(account_id)
        .execute(pool)
        .await
        .map(|_| ())
}
