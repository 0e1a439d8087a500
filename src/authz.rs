//! Field-level authorization
//!
//! [`AuthGuard`] is the `@auth` marker: attaching it to a field definition with
//! `#[graphql(guard = "AuthGuard")]` makes the engine run the check before the
//! resolver body, which is never entered for an anonymous caller. Fields without
//! the guard resolve exactly as written.
//!
//! Resource ownership is a separate concern handled by [`ensure_owner`] inside
//! the resolvers that need it.

use async_graphql::{Context, Guard};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::{AppError, AppResult};
use crate::identity::Principal;

/// Requires a non-null principal in the [`RequestContext`]
#[derive(Debug, Default, Clone, Copy)]
pub struct AuthGuard;

impl Guard for AuthGuard {
    async fn check(&self, ctx: &Context<'_>) -> async_graphql::Result<()> {
        let authenticated = ctx
            .data_opt::<RequestContext>()
            .and_then(RequestContext::principal)
            .is_some();

        if authenticated {
            Ok(())
        } else {
            tracing::debug!(field = %ctx.item.node.name.node, "anonymous call to guarded field");
            Err(AppError::unauthenticated().into())
        }
    }
}

/// The request's [`RequestContext`]
pub fn request_context<'a>(ctx: &Context<'a>) -> AppResult<&'a RequestContext> {
    ctx.data_opt::<RequestContext>()
        .ok_or_else(|| AppError::Internal("request context missing from GraphQL request".to_string()))
}

/// Principal of a guarded field's caller
pub fn principal<'a>(ctx: &Context<'a>) -> AppResult<&'a Principal> {
    request_context(ctx)?
        .principal()
        .ok_or_else(AppError::unauthenticated)
}

/// Reject callers acting on a resource they do not own
pub fn ensure_owner(principal: &Principal, owner_id: Uuid) -> AppResult<()> {
    if principal.id == owner_id {
        Ok(())
    } else {
        tracing::info!(user_id = %principal.id, %owner_id, "ownership check failed");
        Err(AppError::Forbidden("Not authorized".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::normalize;
    use crate::validation::ConstraintValidator;
    use async_graphql::{EmptyMutation, EmptySubscription, Object, Request, Schema};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ProbeQuery {
        calls: Arc<AtomicUsize>,
    }

    #[Object]
    impl ProbeQuery {
        async fn public_value(&self) -> i32 {
            7
        }

        #[graphql(guard = "AuthGuard")]
        async fn secret(&self, ctx: &Context<'_>, factor: i32) -> async_graphql::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{}:{}", principal(ctx)?.username, factor * 2))
        }
    }

    fn probe() -> (Schema<ProbeQuery, EmptyMutation, EmptySubscription>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let schema = Schema::new(
            ProbeQuery { calls: calls.clone() },
            EmptyMutation,
            EmptySubscription,
        );
        (schema, calls)
    }

    fn context(principal: Option<Principal>) -> RequestContext {
        RequestContext::new(principal, Arc::new(ConstraintValidator))
    }

    #[tokio::test]
    async fn test_anonymous_call_never_enters_resolver() {
        let (schema, calls) = probe();
        let request = Request::new("{ publicValue secret(factor: 2) }").data(context(None));
        let response = normalize(schema.execute(request).await);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["errors"][0]["extensions"]["code"], "AUTHENTICATION_ERROR");
        assert_eq!(json["errors"][0]["message"], "Not authenticated");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unguarded_field_still_resolves() {
        let (schema, _) = probe();
        let request = Request::new("{ publicValue }").data(context(None));
        let response = normalize(schema.execute(request).await);

        assert!(response.errors.is_empty());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"]["publicValue"], 7);
    }

    #[tokio::test]
    async fn test_authenticated_call_runs_resolver_unchanged() {
        let (schema, calls) = probe();
        let nina = Principal {
            id: Uuid::new_v4(),
            username: "nina".to_string(),
            email: "nina@x.com".to_string(),
        };
        let request = Request::new("{ secret(factor: 21) }").data(context(Some(nina)));
        let response = schema.execute(request).await;

        assert!(response.errors.is_empty());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"]["secret"], "nina:42");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_context_is_anonymous() {
        let (schema, calls) = probe();
        let response = normalize(schema.execute("{ secret(factor: 1) }").await);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["errors"][0]["extensions"]["code"], "AUTHENTICATION_ERROR");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_ensure_owner() {
        let owner = Principal {
            id: Uuid::new_v4(),
            username: "a".to_string(),
            email: "a@x.com".to_string(),
        };
        assert!(ensure_owner(&owner, owner.id).is_ok());
        assert_eq!(
            ensure_owner(&owner, Uuid::new_v4()),
            Err(AppError::Forbidden("Not authorized".to_string()))
        );
    }
}
