//! REST API module.
//!
//! Every handler answers with the `{success, data?, message, errors?}`
//! envelope; failures go through [`AppError`].

mod analytics;
mod auth;
mod notifications;
mod projects;
mod users;

pub use analytics::*;
pub use auth::*;
pub use notifications::*;
pub use projects::*;
pub use users::*;

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::AppError;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip)]
    pub status: StatusCode,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub message: String,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// 200 with data.
pub fn success<T: Serialize>(data: T, message: impl Into<String>) -> ApiResult<T> {
    Ok(ApiResponse {
        status: StatusCode::OK,
        success: true,
        data: Some(data),
        message: message.into(),
    })
}

/// 201 with the created resource.
pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> ApiResult<T> {
    Ok(ApiResponse {
        status: StatusCode::CREATED,
        success: true,
        data: Some(data),
        message: message.into(),
    })
}

/// 200 without data.
pub fn acknowledged(message: impl Into<String>) -> ApiResult<()> {
    Ok(ApiResponse {
        status: StatusCode::OK,
        success: true,
        data: None,
        message: message.into(),
    })
}

/// JSON body whose rejection is reported in the envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Query string whose rejection is reported in the envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// GET /api/health - Liveness check.
pub async fn health_check() -> ApiResult<Health> {
    success(
        Health {
            status: "ok",
            timestamp: Utc::now(),
        },
        "Server is running",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_missing_data() {
        let response = acknowledged("User deleted successfully").unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "message": "User deleted successfully"})
        );
    }

    #[test]
    fn test_created_status() {
        let response = created(1, "Created").unwrap();
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.into_response().status(), StatusCode::CREATED);
    }
}
