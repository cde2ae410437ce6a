//! Models that represent accounts and the payloads exchanged at signup and
//! login.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
/// Database representation of a registered account.
pub struct Account {
    /// Unique identifier for the account.
    pub id: String,
    /// SHA-256 hash of the client's access key. The raw key never reaches
    /// this service; hashing happens client-side.
    pub key_hash: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Optional date of birth collected at signup.
    pub date_of_birth: Option<NaiveDate>,
    /// Optional self-reported gender.
    pub gender: Option<String>,
    /// Optional free-form answer to "what brings you here".
    pub purpose: Option<String>,
    /// Creation timestamp for auditing.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent successful login.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn new(key_hash: String, profile: SignupProfile) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            key_hash,
            display_name: profile.display_name,
            date_of_birth: profile.date_of_birth,
            gender: profile.gender,
            purpose: profile.purpose,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Profile fields submitted alongside a key hash at signup.
pub struct SignupProfile {
    pub display_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Public view of an account. Never carries the key hash.
pub struct AccountResponse {
    pub id: String,
    pub display_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub purpose: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            display_name: account.display_name,
            date_of_birth: account.date_of_birth,
            gender: account.gender,
            purpose: account.purpose,
            created_at: account.created_at,
            last_login_at: account.last_login_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Token and account returned after a successful login or refresh.
pub struct LoginResponse {
    pub token: String,
    pub account: AccountResponse,
}
