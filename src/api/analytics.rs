//! Analytics API endpoints. Admin only.

use axum::extract::State;
use chrono::Utc;

use super::{success, ApiResult};
use crate::analytics;
use crate::auth::RequireAdmin;
use crate::models::{DashboardStats, ProjectAnalytics, ProjectFilter, UserAnalytics};
use crate::AppState;

/// GET /api/analytics/dashboard - Headline numbers.
pub async fn dashboard_stats(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> ApiResult<DashboardStats> {
    let users = state.repo.list_users(None).await?;
    let projects = state.repo.list_projects(&ProjectFilter::default()).await?;
    success(
        analytics::dashboard_stats(&users, &projects, Utc::now()),
        "Dashboard statistics retrieved successfully",
    )
}

/// GET /api/analytics/projects - Project breakdowns.
pub async fn project_analytics(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> ApiResult<ProjectAnalytics> {
    let projects = state.repo.list_projects(&ProjectFilter::default()).await?;
    success(
        analytics::project_analytics(&projects),
        "Project analytics retrieved successfully",
    )
}

/// GET /api/analytics/users - User breakdowns.
pub async fn user_analytics(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> ApiResult<UserAnalytics> {
    let users = state.repo.list_users(None).await?;
    success(
        analytics::user_analytics(&users),
        "User analytics retrieved successfully",
    )
}
