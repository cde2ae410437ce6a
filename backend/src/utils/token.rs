//! Signed session token codec.
//!
//! A token is three dot-joined base64url segments (header, claims,
//! signature) signed with HMAC-SHA-256. The server never stores a token;
//! it re-derives the signature on every check and persists only the
//! SHA-256 fingerprint produced by [`hash_token`].

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

impl Header {
    fn hs256() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Claim set carried by a session token.
pub struct Claims {
    /// Account id the token was issued to.
    pub sub: String,
    /// Display name at issue time.
    pub name: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Token ID. Makes every issued token unique, so two logins in the
    /// same second still produce distinct session fingerprints.
    pub jti: String,
}

/// Encodes and validates session tokens under an injected signing secret.
pub struct TokenCodec {
    secret: Vec<u8>,
}

impl TokenCodec {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Builds a signed token for `sub` that expires `ttl_seconds` from now.
    ///
    /// Negative TTLs are accepted and produce an already-expired token;
    /// tests use this in place of a movable clock.
    pub fn encode(&self, sub: &str, name: &str, ttl_seconds: i64) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            name: name.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&Header::hs256())?);
        let claims_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signing_input = format!("{}.{}", header_b64, claims_b64);
        let signature_b64 = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes())?);

        Ok(format!("{}.{}", signing_input, signature_b64))
    }

    /// Validates `token` and returns its claims, or `None` when the token
    /// is malformed, carries a bad signature, or is past its expiry.
    ///
    /// Claims are not deserialized before the signature verifies.
    pub fn decode(&self, token: &str) -> Option<Claims> {
        let mut segments = token.split('.');
        let header_b64 = segments.next()?;
        let claims_b64 = segments.next()?;
        let signature_b64 = segments.next()?;
        if segments.next().is_some()
            || header_b64.is_empty()
            || claims_b64.is_empty()
            || signature_b64.is_empty()
        {
            return None;
        }

        let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;
        let signing_input = format!("{}.{}", header_b64, claims_b64);
        if !self.verify(signing_input.as_bytes(), &signature) {
            return None;
        }

        let claims: Claims =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(claims_b64).ok()?).ok()?;
        if claims.exp <= Utc::now().timestamp() {
            return None;
        }

        Some(claims)
    }

    fn sign(&self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| anyhow::anyhow!("unusable signing secret: {}", e))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Constant-time signature check.
    fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        let Ok(mut mac) = HmacSha256::new_from_slice(&self.secret) else {
            return false;
        };
        mac.update(data);
        mac.verify_slice(signature).is_ok()
    }
}

/// Returns the lowercase hex SHA-256 fingerprint of a token, used as the
/// session table's natural key.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
