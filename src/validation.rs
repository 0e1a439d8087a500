//! Input shapes and the validator collaborator
//!
//! Each mutation argument set is a named shape with `validator` constraints.
//! Resolvers hand a shape to the [`InputValidator`] held by the request context.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use validator::{Validate, ValidationError, ValidationErrors};

const PASSWORD_MESSAGE: &str = "Password must be at least 8 characters long, and include at least one lowercase letter, one uppercase letter, one number, and one special character (@$!%*?&).";

const PASSWORD_SPECIALS: &str = "@$!%*?&";

// Allowed alphabet only; the per-class checks live in `validate_password`
static PASSWORD_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z\d@$!%*?&]{8,}$").expect("hardcoded password regex is invalid")
});

/// Password complexity rule for [`RegisterInput`]
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let valid = PASSWORD_CHARSET.is_match(password)
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_complexity");
        err.message = Some(Cow::Borrowed(PASSWORD_MESSAGE));
        Err(err)
    }
}

#[derive(Debug, Clone, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 3, max = 20, message = "Username must be between 3 and 20 characters"))]
    pub username: String,

    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,

    #[validate(custom(function = "validate_password"))]
    pub password: String,
}

#[derive(Debug, Clone, Validate)]
pub struct AddBookInput {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 255, message = "Author must be between 1 and 255 characters"))]
    pub author: String,

    #[validate(range(min = 0, message = "Published year must not be negative"))]
    pub published_year: i32,
}

#[derive(Debug, Clone, Validate)]
pub struct AddReviewInput {
    #[validate(range(min = 1, max = 10, message = "Rating must be between 1 and 10"))]
    pub rating: i32,

    #[validate(length(min = 1, max = 500, message = "Comment must be between 1 and 500 characters"))]
    pub comment: String,
}

#[derive(Debug, Clone, Validate)]
pub struct UpdateReviewInput {
    #[validate(range(min = 1, max = 10, message = "Rating must be between 1 and 10"))]
    pub rating: Option<i32>,

    #[validate(length(min = 1, max = 500, message = "Comment must be between 1 and 500 characters"))]
    pub comment: Option<String>,
}

/// Checks a named input shape, returning every violated constraint message
pub trait InputValidator: Send + Sync {
    fn check(&self, shape: &str, input: &dyn Validate) -> Result<(), Vec<String>>;
}

/// Validator driven by the `#[validate]` constraints on each shape
#[derive(Debug, Default, Clone, Copy)]
pub struct ConstraintValidator;

impl InputValidator for ConstraintValidator {
    fn check(&self, shape: &str, input: &dyn Validate) -> Result<(), Vec<String>> {
        input.validate().map_err(|errors| {
            let messages = violation_messages(&errors);
            tracing::debug!(shape, violations = messages.len(), "input rejected");
            messages
        })
    }
}

/// Flatten field errors into sorted, human-readable messages
pub fn violation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid ({})", field, e.code),
            })
        })
        .collect();
    messages.sort();
    messages
}
