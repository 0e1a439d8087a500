//! # book-review-api
//!
//! GraphQL API for a book-review catalog.
//!
//! ## Features
//!
//! - **Token Service** - HS256 access/refresh pairs with independent secrets
//! - **Identity Resolver** - bearer token to principal, degrading to anonymous
//! - **Auth Guard** - per-field `@auth` marker enforced before the resolver runs
//! - **Request Context** - principal + input validator, built once per request
//! - **Error Normalizer** - stable public error codes at the response boundary
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use book_review_api::{server::{router, AppState}, store::MemoryStore};
//! use book_review_api::token::{SystemClock, TokenService};
//! use book_review_api::validation::ConstraintValidator;
//!
//! let tokens = Arc::new(TokenService::new("access", "refresh", Arc::new(SystemClock)));
//! let state = AppState::new(MemoryStore::shared(), tokens, Arc::new(ConstraintValidator));
//! let app = router(state);
//! ```

pub mod accounts;
pub mod authz;
pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod identity;
pub mod logging;
pub mod pagination;
pub mod password;
pub mod schema;
pub mod server;
pub mod store;
pub mod token;
pub mod types;
pub mod validation;

pub use authz::AuthGuard;
pub use context::{extract_bearer, ContextBuilder, RequestContext};
pub use error::{normalize, AppError, AppResult, ErrorKind};
pub use identity::{IdentityError, IdentityResolver, Principal};
pub use schema::{build_schema, AppSchema};
pub use server::{graphql_handler, router, AppState};
pub use token::{TokenError, TokenPair, TokenService};
