//! Per-request context handed to every resolver

use std::fmt;
use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::identity::{IdentityError, IdentityResolver, Principal};
use crate::validation::InputValidator;

/// Immutable bundle built once per request
#[derive(Clone)]
pub struct RequestContext {
    principal: Option<Principal>,
    validator: Arc<dyn InputValidator>,
}

impl RequestContext {
    pub fn new(principal: Option<Principal>, validator: Arc<dyn InputValidator>) -> Self {
        Self { principal, validator }
    }

    pub fn anonymous(validator: Arc<dyn InputValidator>) -> Self {
        Self::new(None, validator)
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Run `input` through the validator under its shape name
    pub fn validate_input(&self, shape: &str, input: &dyn Validate) -> AppResult<()> {
        self.validator
            .check(shape, input)
            .map_err(|messages| AppError::Validation(format!("Validation failed: {}", messages.join(", "))))
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("principal", &self.principal)
            .finish_non_exhaustive()
    }
}

/// Extract the bearer token from the Authorization header
///
/// A literal `"Bearer "` prefix is stripped when present. A missing or
/// non-UTF-8 header yields an empty token.
pub fn extract_bearer(headers: &HeaderMap) -> &str {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|auth| auth.strip_prefix("Bearer ").unwrap_or(auth).trim())
        .unwrap_or_default()
}

/// Builds a [`RequestContext`] from request headers
#[derive(Clone)]
pub struct ContextBuilder {
    identity: IdentityResolver,
    validator: Arc<dyn InputValidator>,
}

impl ContextBuilder {
    pub fn new(identity: IdentityResolver, validator: Arc<dyn InputValidator>) -> Self {
        Self { identity, validator }
    }

    /// Never fails: any credential problem leaves the request anonymous
    pub async fn build(&self, headers: &HeaderMap) -> RequestContext {
        let token = extract_bearer(headers);

        let principal = match self.identity.resolve(token).await {
            Ok(principal) => principal,
            Err(IdentityError::Store(e)) => {
                tracing::warn!(error = %e, "user lookup failed, continuing anonymously");
                None
            }
            Err(e) => {
                tracing::debug!(reason = %e, "rejected bearer token, continuing anonymously");
                None
            }
        };

        RequestContext::new(principal, self.validator.clone())
    }
}
