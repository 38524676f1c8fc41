//! Database repository for CRUD operations.
//!
//! Entity operations live in sibling modules as `impl Repository` blocks.
//! Read-modify-write updates run inside a transaction.

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::errors::AppError;
use crate::models::{
    ClientSnapshot, DeveloperSnapshot, Notification, NotificationType, Priority, Project,
    ProjectStatus, Role, Task, User,
};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pub(super) pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Start a transaction that takes the write lock before its first read,
    /// so concurrent writers wait on the busy timeout instead of failing.
    pub(super) async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin_with("BEGIN IMMEDIATE").await
    }
}

/// Map a unique-email violation to the user-facing conflict.
pub(super) fn duplicate_email(err: sqlx::Error) -> AppError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("User already exists".to_string())
        }
        _ => AppError::from(err),
    }
}

// Helper functions for row conversion

pub(super) const USER_COLUMNS: &str =
    "id, name, email, role, company, skills, bio, avatar, password_hash, created_at, updated_at";

pub(super) const PROJECT_COLUMNS: &str = "id, title, description, status, client, developers, budget, spent, deadline, progress, tasks, created_at, updated_at";

pub(super) const NOTIFICATION_COLUMNS: &str =
    "id, user_id, kind, title, description, priority, read, metadata, timestamp";

/// Decode a TEXT column through `FromStr`.
fn enum_column<T: FromStr>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|_| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("unexpected value {:?}", raw).into(),
    })
}

pub(super) fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    let skills: Option<Json<Vec<String>>> = row.try_get("skills")?;
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role: enum_column::<Role>(row, "role")?,
        company: row.try_get("company")?,
        skills: skills.map(|Json(s)| s),
        bio: row.try_get("bio")?,
        avatar: row.try_get("avatar")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        password_hash: row.try_get("password_hash")?,
    })
}

pub(super) fn project_from_row(row: &SqliteRow) -> Result<Project, sqlx::Error> {
    let Json(client): Json<ClientSnapshot> = row.try_get("client")?;
    let Json(developers): Json<Vec<DeveloperSnapshot>> = row.try_get("developers")?;
    let Json(tasks): Json<Vec<Task>> = row.try_get("tasks")?;
    Ok(Project {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        status: enum_column::<ProjectStatus>(row, "status")?,
        client,
        developers,
        budget: row.try_get("budget")?,
        spent: row.try_get("spent")?,
        deadline: row.try_get("deadline")?,
        progress: row.try_get("progress")?,
        tasks,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(super) fn notification_from_row(row: &SqliteRow) -> Result<Notification, sqlx::Error> {
    let metadata: Option<Json<serde_json::Map<String, serde_json::Value>>> =
        row.try_get("metadata")?;
    Ok(Notification {
        id: row.try_get("id")?,
        kind: enum_column::<NotificationType>(row, "kind")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        timestamp: row.try_get("timestamp")?,
        read: row.try_get("read")?,
        priority: enum_column::<Priority>(row, "priority")?,
        user_id: row.try_get("user_id")?,
        metadata: metadata.map(|Json(m)| m),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::db::init_database;

    /// Repository over a fresh database file; keep the guard alive.
    pub async fn repository() -> (Repository, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("test.sqlite").display());
        let pool = init_database(&url).await.unwrap();
        (Repository::new(pool), dir)
    }
}
