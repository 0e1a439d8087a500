//! Error taxonomy and response-boundary normalization
//!
//! Every fault a resolver or guard raises is an [`AppError`]. It travels inside
//! `async_graphql::Error` as the error source, and [`normalize`] turns it into a
//! stable public `code` extension once the whole response has been produced.

use async_graphql::{Response, ServerError};
use thiserror::Error;

use crate::store::StoreError;
use crate::token::TokenError;

/// Message returned to callers in place of internal fault details
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Discriminant of an [`AppError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Authentication,
    Forbidden,
    Validation,
    ResourceNotFound,
    UserInput,
    Internal,
}

impl ErrorKind {
    /// Public wire code for this kind, `None` for internal faults
    pub fn code(self) -> Option<&'static str> {
        match self {
            ErrorKind::Authentication => Some("AUTHENTICATION_ERROR"),
            ErrorKind::Forbidden => Some("FORBIDDEN_ERROR"),
            ErrorKind::Validation => Some("VALIDATION_ERROR"),
            ErrorKind::ResourceNotFound => Some("RESOURCE_NOT_FOUND"),
            ErrorKind::UserInput => Some("USER_INPUT_ERROR"),
            ErrorKind::Internal => None,
        }
    }
}

/// Application error raised by resolvers, guards and services
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppError {
    /// No credential, or a bad or expired one
    #[error("{0}")]
    Authentication(String),

    /// Valid credential without rights over the target resource
    #[error("{0}")]
    Forbidden(String),

    /// Input failed a shape constraint
    #[error("{0}")]
    Validation(String),

    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Input rejected for domain reasons
    #[error("{0}")]
    UserInput(String),

    /// Store or infrastructure fault, never shown to the caller
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn unauthenticated() -> Self {
        AppError::Authentication("Not authenticated".to_string())
    }

    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("No {} found", what))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Authentication(_) => ErrorKind::Authentication,
            AppError::Forbidden(_) => ErrorKind::Forbidden,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::NotFound(_) => ErrorKind::ResourceNotFound,
            AppError::UserInput(_) => ErrorKind::UserInput,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Authentication(m)
            | AppError::Forbidden(m)
            | AppError::Validation(m)
            | AppError::NotFound(m)
            | AppError::UserInput(m)
            | AppError::Internal(m) => m,
        }
    }

    /// Public code, see [`ErrorKind::code`]
    pub fn code(&self) -> Option<&'static str> {
        self.kind().code()
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::Authentication(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(what) => AppError::UserInput(format!("{} already exists", what)),
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Result type for application operations
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Attach public codes to every error of an executed response
///
/// Errors whose source is an [`AppError`] get `extensions.code`; internal
/// faults are logged and their message replaced. Anything else (parse errors,
/// argument coercion, unknown fields) is left exactly as the engine produced it.
pub fn normalize(mut response: Response) -> Response {
    for error in response.errors.iter_mut() {
        normalize_error(error);
    }
    response
}

fn normalize_error(error: &mut ServerError) {
    let (code, detail) = match error.source::<AppError>() {
        Some(app_error) => (app_error.code(), app_error.message().to_string()),
        None => return,
    };

    match code {
        Some(code) => {
            error
                .extensions
                .get_or_insert_with(Default::default)
                .set("code", code);
        }
        None => {
            tracing::error!(
                path = ?error.path,
                detail = %detail,
                "internal error while resolving field"
            );
            error.message = INTERNAL_ERROR_MESSAGE.to_string();
        }
    }
}
