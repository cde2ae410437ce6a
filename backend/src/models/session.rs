//! Models for server-side session records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
/// One revocable record per issued token, keyed by the token's fingerprint.
///
/// The row is the authoritative revocation switch: deleting it invalidates
/// the token even while its signature and expiry claim would still pass.
pub struct Session {
    /// SHA-256 fingerprint of the issued token.
    pub token_hash: String,
    /// Account that owns the session.
    pub account_id: String,
    /// Instant after which the session is unusable.
    pub expires_at: DateTime<Utc>,
    /// Whether the session uses the long-lived remember-me TTL class.
    pub is_remembered: bool,
    pub created_at: DateTime<Utc>,
    /// Client user agent, captured for audit only.
    pub user_agent: Option<String>,
}

impl Session {
    pub fn new(
        token_hash: String,
        account_id: String,
        expires_at: DateTime<Utc>,
        is_remembered: bool,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            token_hash,
            account_id,
            expires_at,
            is_remembered,
            created_at: Utc::now(),
            user_agent,
        }
    }

    /// True when the record itself has lapsed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
