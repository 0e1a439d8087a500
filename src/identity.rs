//! Bearer token → authenticated principal

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::store::{SharedStore, StoreError, UserRecord};
use crate::token::{TokenError, TokenService};

/// The authenticated caller of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&UserRecord> for Principal {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// Why a presented token did not yield a principal
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TokenError> for IdentityError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => IdentityError::ExpiredToken,
            TokenError::Malformed => IdentityError::InvalidToken,
        }
    }
}

/// Resolves access tokens to principals with a single store lookup
#[derive(Clone)]
pub struct IdentityResolver {
    tokens: Arc<TokenService>,
    store: SharedStore,
}

impl IdentityResolver {
    pub fn new(tokens: Arc<TokenService>, store: SharedStore) -> Self {
        Self { tokens, store }
    }

    /// Resolve a raw bearer token
    ///
    /// An empty token is anonymous (`Ok(None)`), as is a valid token whose
    /// subject no longer exists. Bad and expired tokens are reported as
    /// distinct errors; callers decide whether to degrade them.
    pub async fn resolve(&self, raw_token: &str) -> Result<Option<Principal>, IdentityError> {
        if raw_token.is_empty() {
            return Ok(None);
        }

        let user_id = self.tokens.verify_access(raw_token)?;
        let user = self.store.find_user_by_id(user_id).await?;

        if user.is_none() {
            tracing::debug!(%user_id, "token subject no longer exists");
        }
        Ok(user.as_ref().map(Principal::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, NewUser, Store};
    use crate::token::{ManualClock, SystemClock};
    use chrono::Duration;

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new("access", "refresh", Arc::new(SystemClock)))
    }

    async fn seeded_store() -> (SharedStore, UserRecord) {
        let store = MemoryStore::shared();
        let user = store
            .create_user(NewUser {
                username: "nina".to_string(),
                email: "nina@x.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn test_empty_token_is_anonymous() {
        let (store, _) = seeded_store().await;
        let resolver = IdentityResolver::new(tokens(), store);
        assert_eq!(resolver.resolve("").await, Ok(None));
    }

    #[tokio::test]
    async fn test_valid_token_resolves_principal() {
        let (store, user) = seeded_store().await;
        let tokens = tokens();
        let pair = tokens.issue(user.id).unwrap();
        let resolver = IdentityResolver::new(tokens, store);

        let principal = resolver.resolve(&pair.access_token).await.unwrap().unwrap();
        assert_eq!(principal.id, user.id);
        assert_eq!(principal.username, "nina");
        assert_eq!(principal.email, "nina@x.com");
    }

    #[tokio::test]
    async fn test_unknown_subject_is_anonymous() {
        let (store, _) = seeded_store().await;
        let tokens = tokens();
        let pair = tokens.issue(Uuid::new_v4()).unwrap();
        let resolver = IdentityResolver::new(tokens, store);

        assert_eq!(resolver.resolve(&pair.access_token).await, Ok(None));
    }

    #[tokio::test]
    async fn test_failures_are_classified() {
        let (store, user) = seeded_store().await;
        let clock = Arc::new(ManualClock::new());
        let tokens = Arc::new(TokenService::new("access", "refresh", clock.clone()));
        let pair = tokens.issue(user.id).unwrap();
        let resolver = IdentityResolver::new(tokens, store);

        assert_eq!(
            resolver.resolve("garbage").await,
            Err(IdentityError::InvalidToken)
        );
        assert_eq!(
            resolver.resolve(&pair.refresh_token).await,
            Err(IdentityError::InvalidToken)
        );

        clock.advance(Duration::minutes(16));
        assert_eq!(
            resolver.resolve(&pair.access_token).await,
            Err(IdentityError::ExpiredToken)
        );
    }
}
