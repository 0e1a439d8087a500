//! Access/refresh token issuance and verification
//!
//! Both token kinds are HS256 JWTs carrying `{sub, iat, exp, jti}`. They are
//! signed with independent secrets, so a refresh token never verifies on the
//! access path and the other way round. Expiry is judged against a [`Clock`]
//! rather than the wall clock jsonwebtoken would use.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtSettings;

/// Access token lifetime (15 minutes)
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;

/// Refresh token lifetime (7 days)
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Token verification failure
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token")]
    Malformed,
}

/// Source of "now" for token issuance and expiry checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that runs from the system time plus a manually advanced offset
#[derive(Debug, Default)]
pub struct ManualClock {
    offset_secs: AtomicI64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.offset_secs.fetch_add(by.num_seconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(self.offset_secs.load(Ordering::SeqCst))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
    jti: String,
}

/// Freshly issued access + refresh pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SigningKey {
    fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs),
        }
    }
}

/// Issues and verifies access/refresh tokens
pub struct TokenService {
    access: SigningKey,
    refresh: SigningKey,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(access_secret: &str, refresh_secret: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            access: SigningKey::new(access_secret, ACCESS_TOKEN_TTL_SECS),
            refresh: SigningKey::new(refresh_secret, REFRESH_TOKEN_TTL_SECS),
            clock,
        }
    }

    pub fn from_settings(settings: &JwtSettings, clock: Arc<dyn Clock>) -> Self {
        Self::new(&settings.access_secret, &settings.refresh_secret, clock)
    }

    /// Sign a new access + refresh pair for `user_id`
    pub fn issue(&self, user_id: Uuid) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.sign(&self.access, user_id)?,
            refresh_token: self.sign(&self.refresh, user_id)?,
        })
    }

    pub fn verify_access(&self, token: &str) -> Result<Uuid, TokenError> {
        self.verify(&self.access, token)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Uuid, TokenError> {
        self.verify(&self.refresh, token)
    }

    fn sign(&self, key: &SigningKey, user_id: Uuid) -> Result<String, TokenError> {
        let now = self.clock.now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + key.ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &key.encoding).map_err(|e| {
            tracing::error!(error = %e, "failed to sign token");
            TokenError::Malformed
        })
    }

    fn verify(&self, key: &SigningKey, token: &str) -> Result<Uuid, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = decode::<Claims>(token, &key.decoding, &validation)
            .map_err(|_| TokenError::Malformed)?;

        if data.claims.exp <= self.clock.now().timestamp() {
            return Err(TokenError::Expired);
        }

        Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(clock: Arc<dyn Clock>) -> TokenService {
        TokenService::new("access-secret", "refresh-secret", clock)
    }

    #[test]
    fn test_access_round_trip() {
        let tokens = service(Arc::new(SystemClock));
        let user_id = Uuid::new_v4();
        let pair = tokens.issue(user_id).unwrap();

        assert_eq!(tokens.verify_access(&pair.access_token), Ok(user_id));
        assert_eq!(tokens.verify_refresh(&pair.refresh_token), Ok(user_id));
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let tokens = service(Arc::new(SystemClock));
        let pair = tokens.issue(Uuid::new_v4()).unwrap();

        assert_eq!(tokens.verify_access(&pair.refresh_token), Err(TokenError::Malformed));
        assert_eq!(tokens.verify_refresh(&pair.access_token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_each_issue_is_distinct() {
        let tokens = service(Arc::new(SystemClock));
        let user_id = Uuid::new_v4();
        let first = tokens.issue(user_id).unwrap();
        let second = tokens.issue(user_id).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_access_expires_after_fifteen_minutes() {
        let clock = Arc::new(ManualClock::new());
        let tokens = service(clock.clone());
        let pair = tokens.issue(Uuid::new_v4()).unwrap();

        clock.advance(Duration::minutes(14));
        assert!(tokens.verify_access(&pair.access_token).is_ok());

        clock.advance(Duration::minutes(2));
        assert_eq!(tokens.verify_access(&pair.access_token), Err(TokenError::Expired));
        assert!(tokens.verify_refresh(&pair.refresh_token).is_ok());
    }

    #[test]
    fn test_refresh_expires_after_seven_days() {
        let clock = Arc::new(ManualClock::new());
        let tokens = service(clock.clone());
        let pair = tokens.issue(Uuid::new_v4()).unwrap();

        clock.advance(Duration::days(7) + Duration::seconds(1));
        assert_eq!(tokens.verify_refresh(&pair.refresh_token), Err(TokenError::Expired));
    }

    #[test]
    fn test_garbage_and_tampered_tokens_are_malformed() {
        let tokens = service(Arc::new(SystemClock));
        assert_eq!(tokens.verify_access("not-a-jwt"), Err(TokenError::Malformed));
        assert_eq!(tokens.verify_access(""), Err(TokenError::Malformed));

        let pair = tokens.issue(Uuid::new_v4()).unwrap();
        let mut tampered = pair.access_token.clone();
        tampered.push('x');
        assert_eq!(tokens.verify_access(&tampered), Err(TokenError::Malformed));

        let foreign = TokenService::new("other-secret", "refresh-secret", Arc::new(SystemClock));
        assert_eq!(foreign.verify_access(&pair.access_token), Err(TokenError::Malformed));
    }
}
