//! GraphQL schema: query and mutation roots

pub mod mutation;
pub mod query;

use std::sync::Arc;

use async_graphql::{EmptySubscription, Schema};

use crate::store::SharedStore;
use crate::token::TokenService;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

/// Book-review API schema
pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema around its process-wide collaborators
///
/// The per-request `RequestContext` is not schema data; it is attached to each
/// `async_graphql::Request` by the context builder.
pub fn build_schema(store: SharedStore, tokens: Arc<TokenService>) -> AppSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(store)
        .data(tokens)
        .finish()
}
