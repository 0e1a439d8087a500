//! HTTP surface: `POST /graphql` and `GET /health`

use std::sync::Arc;

use async_graphql::{Request, Response};
use axum::{
    extract::Extension,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};

use crate::context::ContextBuilder;
use crate::error::normalize;
use crate::identity::IdentityResolver;
use crate::schema::{build_schema, AppSchema};
use crate::store::SharedStore;
use crate::token::TokenService;
use crate::validation::InputValidator;

/// Everything a request needs, shared read-only across requests
#[derive(Clone)]
pub struct AppState {
    schema: AppSchema,
    contexts: ContextBuilder,
}

impl AppState {
    pub fn new(
        store: SharedStore,
        tokens: Arc<TokenService>,
        validator: Arc<dyn InputValidator>,
    ) -> Self {
        let identity = IdentityResolver::new(tokens.clone(), store.clone());
        Self {
            schema: build_schema(store, tokens),
            contexts: ContextBuilder::new(identity, validator),
        }
    }

    /// Build the request context, execute, and normalize errors
    pub async fn execute(&self, headers: &HeaderMap, request: Request) -> Response {
        let context = self.contexts.build(headers).await;
        let response = self.schema.execute(request.data(context)).await;
        normalize(response)
    }
}

/// GraphQL endpoint
///
/// # Example
///
/// ```rust,no_run
/// use axum::{Router, routing::post};
/// use book_review_api::server::graphql_handler;
///
/// let app: Router = Router::new().route("/graphql", post(graphql_handler));
/// ```
pub async fn graphql_handler(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Json(request): Json<Request>,
) -> Json<Response> {
    Json(state.execute(&headers, request).await)
}

async fn health() -> &'static str {
    "ok"
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/graphql", post(graphql_handler))
        .route("/health", get(health))
        .layer(Extension(state))
}
