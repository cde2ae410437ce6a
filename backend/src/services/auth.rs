//! Core auth flows: signup, login, verify, refresh, logout.
//!
//! The service only ever handles the hash of an access key; hashing the raw
//! key is the caller's job and the raw key never crosses this boundary.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::{
    config::Config,
    error::AppError,
    models::{
        account::{Account, AccountResponse, LoginResponse, SignupProfile},
        session::Session,
    },
    repositories::{account as account_repo, session as session_repo},
    utils::token::{hash_token, Claims, TokenCodec},
};

#[derive(Debug, Clone)]
/// Outcome of checking a presented token against signature, expiry claim,
/// and the session store.
pub struct Verification {
    pub valid: bool,
    pub claims: Option<Claims>,
}

impl Verification {
    fn invalid() -> Self {
        Self {
            valid: false,
            claims: None,
        }
    }

    fn valid(claims: Claims) -> Self {
        Self {
            valid: true,
            claims: Some(claims),
        }
    }
}

/// Orchestrates the account registry, token codec, and session store.
///
/// Stateless per request; all shared mutable state lives in Postgres.
pub struct AuthService {
    pool: PgPool,
    codec: TokenCodec,
    session_ttl: Duration,
    remembered_session_ttl: Duration,
}

impl AuthService {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        Self {
            pool,
            codec: TokenCodec::new(config.token_secret.as_bytes()),
            session_ttl: Duration::days(config.session_ttl_days as i64),
            remembered_session_ttl: Duration::days(config.remember_me_ttl_days as i64),
        }
    }

    /// Registers a new account under a key hash. No token is issued;
    /// the client logs in separately.
    pub async fn signup(
        &self,
        key_hash: &str,
        profile: SignupProfile,
    ) -> Result<AccountResponse, AppError> {
        let account = Account::new(key_hash.to_string(), profile);
        account_repo::create_account(&self.pool, &account)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AppError::Conflict("this access key is already registered".to_string())
                } else {
                    AppError::Internal(err.into())
                }
            })?;

        tracing::info!(account_id = %account.id, "account registered");
        Ok(AccountResponse::from(account))
    }

    /// Exchanges a registered key hash for a fresh session token.
    ///
    /// An unknown key fails with the same generic message as any other
    /// lookup failure so registered keys cannot be enumerated.
    pub async fn login(
        &self,
        key_hash: &str,
        remember_me: bool,
        user_agent: Option<&str>,
    ) -> Result<LoginResponse, AppError> {
        let account = account_repo::find_account_by_key_hash(&self.pool, key_hash)
            .await
            .map_err(|err| AppError::Internal(err.into()))?
            .ok_or_else(|| {
                tracing::debug!("login with unregistered key hash");
                AppError::Auth("invalid access key".to_string())
            })?;

        let account_id = account.id.clone();
        let response = self.issue_session(account, remember_me, user_agent).await?;

        // Best-effort stamp; never fails the login flow.
        if let Err(err) = account_repo::touch_last_login(&self.pool, &account_id, Utc::now()).await
        {
            tracing::warn!(account_id = %account_id, error = %err, "failed to stamp last login");
        }

        Ok(response)
    }

    /// Checks a presented token. Valid means all three hold: the signature
    /// verifies, the expiry claim is in the future, and an unexpired session
    /// row exists for the token's fingerprint.
    ///
    /// Store failures surface as `AppError::Internal`, never as
    /// `valid: false`.
    pub async fn verify(&self, token: &str) -> Result<Verification, AppError> {
        let Some(claims) = self.codec.decode(token) else {
            tracing::debug!("token rejected by codec");
            return Ok(Verification::invalid());
        };

        let session = session_repo::find_session_by_token_hash(&self.pool, &hash_token(token))
            .await
            .map_err(|err| AppError::Internal(err.into()))?;

        match session {
            Some(session) if !session.is_expired_at(Utc::now()) => {
                Ok(Verification::valid(claims))
            }
            Some(_) => {
                tracing::debug!(sub = %claims.sub, "session record expired");
                Ok(Verification::invalid())
            }
            None => {
                tracing::debug!(sub = %claims.sub, "no session record; token revoked or never issued");
                Ok(Verification::invalid())
            }
        }
    }

    /// Rotates a live token: deletes the old session row, then mints a
    /// replacement that keeps the old row's remember-me TTL class.
    ///
    /// Delete-then-insert is deliberately not atomic. A crash between the
    /// steps loses the session; the retired token must not stay usable.
    pub async fn refresh(
        &self,
        token: &str,
        user_agent: Option<&str>,
    ) -> Result<LoginResponse, AppError> {
        let claims = self
            .codec
            .decode(token)
            .ok_or_else(|| AppError::Auth("invalid or expired token".to_string()))?;

        let token_hash = hash_token(token);
        let old_session = session_repo::find_session_by_token_hash(&self.pool, &token_hash)
            .await
            .map_err(|err| AppError::Internal(err.into()))?
            .filter(|session| !session.is_expired_at(Utc::now()))
            .ok_or_else(|| {
                tracing::debug!(sub = %claims.sub, "refresh against a revoked or lapsed session");
                AppError::Auth("invalid or expired token".to_string())
            })?;

        let account = account_repo::find_account_by_id(&self.pool, &claims.sub)
            .await
            .map_err(|err| AppError::Internal(err.into()))?
            .ok_or_else(|| AppError::NotFound("account no longer exists".to_string()))?;

        // One-time use: the old row goes away even though it had time left.
        session_repo::delete_session_by_token_hash(&self.pool, &token_hash)
            .await
            .map_err(|err| AppError::Internal(err.into()))?;

        self.issue_session(account, old_session.is_remembered, user_agent)
            .await
    }

    /// Revokes whatever session the token maps to. Idempotent: unknown,
    /// expired, and already-revoked tokens all succeed.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        session_repo::delete_session_by_token_hash(&self.pool, &hash_token(token))
            .await
            .map_err(|err| AppError::Internal(err.into()))
    }

    async fn issue_session(
        &self,
        account: Account,
        remembered: bool,
        user_agent: Option<&str>,
    ) -> Result<LoginResponse, AppError> {
        let ttl = if remembered {
            self.remembered_session_ttl
        } else {
            self.session_ttl
        };

        let token = self
            .codec
            .encode(&account.id, &account.display_name, ttl.num_seconds())
            .map_err(AppError::Internal)?;

        let session = Session::new(
            hash_token(&token),
            account.id.clone(),
            Utc::now() + ttl,
            remembered,
            user_agent.map(|ua| ua.to_string()),
        );
        session_repo::insert_session(&self.pool, &session)
            .await
            .map_err(|err| AppError::Internal(err.into()))?;

        Ok(LoginResponse {
            token,
            account: AccountResponse::from(account),
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
