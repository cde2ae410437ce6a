use serde::{Deserialize, Serialize};
use std::env;

use crate::error::AppError;

/// Minimum accepted length, in bytes, for the token signing secret.
pub const MIN_TOKEN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub token_secret: String,
    pub session_ttl_days: u64,
    pub remember_me_ttl_days: u64,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/moodreel".to_string());

        // No default: the service must not start without a real signing secret.
        let token_secret = env::var("AUTH_TOKEN_SECRET")
            .map_err(|_| AppError::Config("AUTH_TOKEN_SECRET is not set".to_string()))?;
        if token_secret.len() < MIN_TOKEN_SECRET_LEN {
            return Err(AppError::Config(format!(
                "AUTH_TOKEN_SECRET must be at least {} bytes",
                MIN_TOKEN_SECRET_LEN
            )));
        }

        let session_ttl_days = env::var("SESSION_TTL_DAYS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .unwrap_or(1);

        let remember_me_ttl_days = env::var("REMEMBER_ME_TTL_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        Ok(Config {
            database_url,
            token_secret,
            session_ttl_days,
            remember_me_ttl_days,
        })
    }
}
