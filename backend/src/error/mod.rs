//! Error taxonomy for the auth service.
//!
//! Messages carried by per-request variants are intentionally generic; the
//! detailed failure reason is logged server-side only.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or unusable configuration. Fatal at startup, never returned
    /// on a request path.
    #[error("configuration error: {0}")]
    Config(String),
    /// The access key hash is already bound to an account.
    #[error("{0}")]
    Conflict(String),
    /// Invalid access key, or an invalid/expired/revoked token.
    #[error("{0}")]
    Auth(String),
    /// A referenced record no longer exists.
    #[error("{0}")]
    NotFound(String),
    /// Backing-store failure, distinct from "no matching row".
    #[error("internal error")]
    Internal(anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("resource not found".to_string()),
            _ => AppError::Internal(err.into()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn other_sqlx_errors_map_to_internal() {
        let err = AppError::from(sqlx::Error::PoolClosed);
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn internal_error_displays_generic_message() {
        let err = AppError::Internal(anyhow::anyhow!("connection refused to 10.0.0.7"));
        assert_eq!(err.to_string(), "internal error");
    }

    #[test]
    fn per_request_errors_display_their_message() {
        let err = AppError::Auth("invalid access key".to_string());
        assert_eq!(err.to_string(), "invalid access key");

        let err = AppError::Conflict("this access key is already registered".to_string());
        assert_eq!(err.to_string(), "this access key is already registered");
    }
}
