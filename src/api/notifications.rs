//! Notification API endpoints.

use axum::extract::{Path, State};

use super::{acknowledged, created, success, ApiResult, AppQuery};
use crate::auth::MaybeAuthUser;
use crate::errors::AppError;
use crate::models::{
    CreateNotificationRequest, MarkedRead, Notification, NotificationListQuery, UnreadCount,
};
use crate::validation::Validated;
use crate::AppState;

fn notification_not_found() -> AppError {
    AppError::NotFound("Notification not found".to_string())
}

/// Non-admin callers only see their own feed.
fn ensure_own_feed(caller: &MaybeAuthUser, user_id: &str) -> Result<(), AppError> {
    match &caller.0 {
        Some(caller) if !caller.is_admin() && caller.user_id != user_id => Err(
            AppError::Forbidden("You can only access your own notifications".to_string()),
        ),
        _ => Ok(()),
    }
}

/// GET /api/notifications/user/:userId - A user's notifications, newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    Path(user_id): Path<String>,
    AppQuery(query): AppQuery<NotificationListQuery>,
) -> ApiResult<Vec<Notification>> {
    ensure_own_feed(&caller, &user_id)?;
    let notifications = state
        .repo
        .list_notifications(&user_id, query.unread.unwrap_or(false))
        .await?;
    success(notifications, "Notifications retrieved successfully")
}

/// GET /api/notifications/user/:userId/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<UnreadCount> {
    ensure_own_feed(&caller, &user_id)?;
    let count = state.repo.unread_notification_count(&user_id).await?;
    success(UnreadCount { user_id, count }, "Unread count retrieved successfully")
}

/// PUT /api/notifications/user/:userId/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<MarkedRead> {
    ensure_own_feed(&caller, &user_id)?;
    let updated = state.repo.mark_all_notifications_read(&user_id).await?;
    success(MarkedRead { updated }, "All notifications marked as read")
}

/// PUT /api/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    Path(id): Path<String>,
) -> ApiResult<Notification> {
    let existing = state
        .repo
        .get_notification(&id)
        .await?
        .ok_or_else(notification_not_found)?;
    ensure_own_feed(&caller, &existing.user_id)?;

    let notification = state
        .repo
        .mark_notification_read(&id)
        .await?
        .ok_or_else(notification_not_found)?;
    success(notification, "Notification marked as read")
}

/// POST /api/notifications - Create a notification.
pub async fn create_notification(
    State(state): State<AppState>,
    Validated(new_notification): Validated<CreateNotificationRequest>,
) -> ApiResult<Notification> {
    let notification = state.repo.create_notification(new_notification).await?;
    tracing::debug!(notification_id = %notification.id, user_id = %notification.user_id, "Notification created");
    created(notification, "Notification created successfully")
}

/// DELETE /api/notifications/:id
pub async fn delete_notification(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let existing = state
        .repo
        .get_notification(&id)
        .await?
        .ok_or_else(notification_not_found)?;
    ensure_own_feed(&caller, &existing.user_id)?;

    if !state.repo.delete_notification(&id).await? {
        return Err(notification_not_found());
    }
    acknowledged("Notification deleted successfully")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthUser;
    use crate::models::Role;

    fn caller(id: &str, role: Role) -> MaybeAuthUser {
        MaybeAuthUser(Some(AuthUser {
            user_id: id.to_string(),
            role,
        }))
    }

    #[test]
    fn test_feed_access() {
        assert!(ensure_own_feed(&MaybeAuthUser(None), "2").is_ok());
        assert!(ensure_own_feed(&caller("2", Role::Developer), "2").is_ok());
        assert!(ensure_own_feed(&caller("4", Role::Admin), "2").is_ok());
        assert!(matches!(
            ensure_own_feed(&caller("3", Role::Client), "2"),
            Err(AppError::Forbidden(_))
        ));
    }
}
