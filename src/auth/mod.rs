//! Bearer-token authentication.
//!
//! The middleware verifies any presented token and stores the caller on the
//! request; extractors read it back in handlers.

pub mod jwt;
pub mod password;

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::Config;
use crate::errors::AppError;
use crate::models::Role;
use crate::AppState;

/// The caller behind a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Token authentication layer.
///
/// A presented token must verify. A missing token is only rejected when
/// `require_auth` is configured.
pub async fn token_auth_layer(config: Arc<Config>, mut request: Request, next: Next) -> Response {
    match bearer_token(request.headers()) {
        Some(token) => match jwt::verify_token(token, &config.jwt) {
            Ok(claims) => {
                request.extensions_mut().insert(AuthUser {
                    user_id: claims.sub,
                    role: claims.role,
                });
            }
            Err(e) => {
                tracing::debug!("Rejected bearer token: {}", e);
                return AppError::Unauthorized("Invalid or expired token".to_string())
                    .into_response();
            }
        },
        None if config.require_auth => {
            return AppError::Unauthorized("Missing bearer token".to_string()).into_response();
        }
        None => {}
    }

    next.run(request).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// The caller, if a token was presented.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(parts.extensions.get::<AuthUser>().cloned()))
    }
}

/// Gate for admin-only handlers.
///
/// Authenticated non-admins get 403. Anonymous callers only get through when
/// authentication is not required.
#[derive(Debug, Clone)]
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthUser>() {
            Some(user) if user.is_admin() => Ok(RequireAdmin),
            Some(_) => Err(AppError::Forbidden("Admin role required".to_string())),
            None if state.config.require_auth => Err(AppError::Unauthorized(
                "Authentication required".to_string(),
            )),
            None => Ok(RequireAdmin),
        }
    }
}
