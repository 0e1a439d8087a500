//! Registration, login and token refresh

use crate::context::RequestContext;
use crate::error::{AppError, AppResult};
use crate::password::{hash_password, verify_password};
use crate::store::{NewUser, SharedStore, UserRecord};
use crate::token::TokenService;
use crate::types::AuthPayload;
use crate::validation::RegisterInput;

fn payload(tokens: &TokenService, user: UserRecord) -> AppResult<AuthPayload> {
    let pair = tokens.issue(user.id).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(AuthPayload {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        user: user.into(),
    })
}

/// Create an account and sign its first token pair
pub async fn register(
    store: &SharedStore,
    tokens: &TokenService,
    ctx: &RequestContext,
    input: RegisterInput,
) -> AppResult<AuthPayload> {
    if store
        .find_user_by_email_or_username(&input.email, &input.username)
        .await?
        .is_some()
    {
        return Err(AppError::UserInput(
            "Username or email already exists".to_string(),
        ));
    }

    ctx.validate_input("RegisterInput", &input)?;

    let user = store
        .create_user(NewUser {
            username: input.username,
            email: input.email,
            password_hash: hash_password(&input.password)?,
        })
        .await?;
    tracing::info!(user_id = %user.id, "user registered");

    payload(tokens, user)
}

pub async fn login(
    store: &SharedStore,
    tokens: &TokenService,
    email: &str,
    password: &str,
) -> AppResult<AuthPayload> {
    let user = store
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    if !verify_password(password, &user.password_hash)? {
        tracing::info!(user_id = %user.id, "login rejected");
        return Err(AppError::UserInput("Invalid password".to_string()));
    }

    payload(tokens, user)
}

/// Exchange a refresh token for a brand-new pair
///
/// The presented token is left untouched; nothing tracks rotation.
pub async fn refresh(
    store: &SharedStore,
    tokens: &TokenService,
    refresh_token: &str,
) -> AppResult<AuthPayload> {
    let user_id = tokens.verify_refresh(refresh_token).map_err(|e| {
        tracing::debug!(reason = %e, "refresh token rejected");
        AppError::Authentication("Invalid refresh token".to_string())
    })?;

    let user = store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Authentication("User not found".to_string()))?;

    payload(tokens, user)
}
