//! Authentication endpoints.

use axum::extract::State;

use super::{created, success, ApiResult};
use crate::auth::{jwt, password, AuthUser};
use crate::errors::AppError;
use crate::models::{AuthPayload, LoginRequest, RegisterRequest, User};
use crate::validation::Validated;
use crate::AppState;

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

/// POST /api/auth/login - Exchange credentials for a token.
pub async fn login(
    State(state): State<AppState>,
    Validated(credentials): Validated<LoginRequest>,
) -> ApiResult<AuthPayload> {
    let user = state
        .repo
        .find_user_by_email(&credentials.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let Some(hash) = user.password_hash.clone() else {
        return Err(invalid_credentials());
    };
    if !password::verify_password_blocking(credentials.password, hash).await? {
        tracing::info!(user_id = %user.id, "Login rejected: wrong password");
        return Err(invalid_credentials());
    }
    if user.role != credentials.role {
        tracing::info!(user_id = %user.id, "Login rejected: role mismatch");
        return Err(invalid_credentials());
    }

    let token = jwt::issue_token(&user.id, user.role, &state.config.jwt)?;
    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
    success(AuthPayload { user, token }, "Login successful")
}

/// POST /api/auth/register - Create an account and sign in.
pub async fn register(
    State(state): State<AppState>,
    Validated(registration): Validated<RegisterRequest>,
) -> ApiResult<AuthPayload> {
    if state
        .repo
        .find_user_by_email(&registration.user.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let mut new_user = registration.user;
    new_user.password_hash = Some(password::hash_password_blocking(registration.password).await?);
    let user = state.repo.create_user(new_user).await?;

    let token = jwt::issue_token(&user.id, user.role, &state.config.jwt)?;
    tracing::info!(user_id = %user.id, role = %user.role, "User registered");
    created(AuthPayload { user, token }, "User registered successfully")
}

/// GET /api/auth/me - The user behind the bearer token.
pub async fn current_user(State(state): State<AppState>, caller: AuthUser) -> ApiResult<User> {
    let user = state
        .repo
        .get_user(&caller.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    success(user, "User found")
}
