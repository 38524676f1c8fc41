use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqliteConnection;

use super::repository::{notification_from_row, Repository, NOTIFICATION_COLUMNS};
use crate::errors::AppError;
use crate::models::{NewNotification, Notification};

pub(super) async fn insert_notification(
    conn: &mut SqliteConnection,
    notification: &Notification,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO notifications (id, user_id, kind, title, description, priority, read, metadata, timestamp) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
    )
    .bind(&notification.id)
    .bind(&notification.user_id)
    .bind(notification.kind.as_str())
    .bind(&notification.title)
    .bind(&notification.description)
    .bind(notification.priority.as_str())
    .bind(notification.read)
    .bind(notification.metadata.as_ref().map(Json))
    .bind(notification.timestamp)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

impl Repository {
    // ==================== NOTIFICATION OPERATIONS ====================

    /// Notifications for one user, newest first.
    pub async fn list_notifications(
        &self,
        user_id: &str,
        unread_only: bool,
    ) -> Result<Vec<Notification>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM notifications WHERE user_id = ? AND (? = 0 OR read = 0) ORDER BY timestamp DESC, rowid DESC",
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(notification_from_row).collect::<Result<_, _>>()?)
    }

    /// Get a notification by ID.
    pub async fn get_notification(&self, id: &str) -> Result<Option<Notification>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM notifications WHERE id = ?",
            NOTIFICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(notification_from_row).transpose()?)
    }

    /// Create a notification stamped with the current time.
    pub async fn create_notification(
        &self,
        new_notification: NewNotification,
    ) -> Result<Notification, AppError> {
        let notification = Notification {
            id: uuid::Uuid::new_v4().to_string(),
            kind: new_notification.kind,
            title: new_notification.title,
            description: new_notification.description,
            timestamp: Utc::now(),
            read: new_notification.read,
            priority: new_notification.priority,
            user_id: new_notification.user_id,
            metadata: new_notification.metadata,
        };

        let mut conn = self.pool.acquire().await?;
        insert_notification(&mut conn, &notification).await?;
        Ok(notification)
    }

    /// Mark one notification as read. `None` when the id is unknown.
    pub async fn mark_notification_read(&self, id: &str) -> Result<Option<Notification>, AppError> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_notification(id).await
    }

    /// Mark every unread notification of a user as read. Returns how many changed.
    pub async fn mark_all_notifications_read(&self, user_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE user_id = ? AND read = 0")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn unread_notification_count(&self, user_id: &str) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = ? AND read = 0")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Delete a notification. Returns whether a row was removed.
    pub async fn delete_notification(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
