//! Error handling module for the Bluespace backend.
//!
//! Provides the application error type with mapping to HTTP status codes and
//! the failure side of the response envelope.

use std::any::Any;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::validation::FieldError;

/// Message sent to clients for any unexpected failure.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or invalid credentials
    #[error("{0}")]
    Unauthorized(String),
    /// Authenticated but not permitted
    #[error("{0}")]
    Forbidden(String),
    /// Resource not found
    #[error("{0}")]
    NotFound(String),
    /// One or more field rules failed
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    /// Malformed request
    #[error("{0}")]
    BadRequest(String),
    /// Duplicate unique field
    #[error("{0}")]
    Conflict(String),
    /// Database error
    #[error("Database error: {0}")]
    Database(String),
    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this error hides its detail from clients.
    pub fn is_internal(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::Internal(_))
    }

    /// Get the message shown to clients.
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                tracing::debug!("Unique constraint violated: {}", db_err);
                return AppError::Conflict("A record with the same unique value already exists".into());
            }
        }
        tracing::error!("Database error: {:?}", err);
        AppError::Database(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::error!("Token error: {:?}", err);
        AppError::Internal(format!("Token error: {}", err))
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::error!("Password hashing error: {:?}", err);
        AppError::Internal(format!("Password hashing error: {}", err))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        tracing::error!("Blocking task failed: {:?}", err);
        AppError::Internal(format!("Blocking task failed: {}", err))
    }
}

/// Failure side of the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    /// Underlying cause, only outside production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        let errors = match error {
            AppError::Validation(errors) => Some(errors.clone()),
            _ => None,
        };

        Self {
            success: false,
            message: error.public_message(),
            errors,
            error: None,
        }
    }
}

/// Detail of an internal failure, carried on the response for
/// [`expose_error_details`] to pick up.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        let mut response = (status, Json(body)).into_response();

        if self.is_internal() {
            tracing::error!("Request failed: {}", self);
            response
                .extensions_mut()
                .insert(InternalErrorDetail(self.to_string()));
        }

        response
    }
}

/// Middleware that adds the internal failure detail to 500 envelopes.
pub async fn expose_error_details(expose: bool, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if !expose {
        return response;
    }

    let Some(InternalErrorDetail(detail)) = response.extensions().get::<InternalErrorDetail>().cloned()
    else {
        return response;
    };

    let body = ErrorResponse {
        success: false,
        message: INTERNAL_MESSAGE.to_string(),
        errors: None,
        error: Some(detail),
    };
    (response.status(), Json(body)).into_response()
}

/// Turn a handler panic into a 500 envelope.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::Internal(format!("Handler panicked: {}", detail)).into_response()
}

/// Fallback for unmatched routes.
pub async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
