use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqliteConnection;

use super::repository::{duplicate_email, user_from_row, Repository, USER_COLUMNS};
use crate::errors::AppError;
use crate::models::{default_avatar, NewUser, Role, User, UserPatch};

/// Company is kept for clients and skills for developers only.
fn apply_role_fields(user: &mut User) {
    if user.role != Role::Client {
        user.company = None;
    }
    if user.role != Role::Developer {
        user.skills = None;
    }
}

pub(super) async fn insert_user(conn: &mut SqliteConnection, user: &User) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO users (id, name, email, role, company, skills, bio, avatar, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.role.as_str())
    .bind(&user.company)
    .bind(user.skills.clone().map(Json))
    .bind(&user.bio)
    .bind(&user.avatar)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(duplicate_email)?;
    Ok(())
}

pub(super) async fn fetch_user(conn: &mut SqliteConnection, id: &str) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(user_from_row).transpose()
}

impl Repository {
    // ==================== USER OPERATIONS ====================

    /// List users in insertion order, optionally restricted to one role.
    pub async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users WHERE (?1 IS NULL OR role = ?1) ORDER BY rowid",
            USER_COLUMNS
        ))
        .bind(role.map(|r| r.as_str()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(user_from_row).collect::<Result<_, _>>()?)
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let mut conn = self.pool.acquire().await?;
        Ok(fetch_user(&mut conn, id).await?)
    }

    /// Look up a user by normalized email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    /// Create a user. A taken email is a conflict.
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let now = Utc::now();
        let mut user = User {
            id: uuid::Uuid::new_v4().to_string(),
            avatar: new_user
                .avatar
                .unwrap_or_else(|| default_avatar(&new_user.email)),
            name: new_user.name,
            email: new_user.email,
            role: new_user.role,
            company: new_user.company,
            skills: new_user.skills,
            bio: new_user.bio,
            created_at: now,
            updated_at: now,
            password_hash: new_user.password_hash,
        };
        apply_role_fields(&mut user);

        let mut conn = self.pool.acquire().await?;
        insert_user(&mut conn, &user).await?;

        tracing::debug!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Merge `patch` over the stored user. `None` when the id is unknown.
    pub async fn update_user(&self, id: &str, patch: &UserPatch) -> Result<Option<User>, AppError> {
        let mut tx = self.begin_write().await?;

        let Some(mut user) = fetch_user(&mut tx, id).await? else {
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            user.name = name.clone();
        }
        if let Some(email) = &patch.email {
            user.email = email.clone();
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(company) = &patch.company {
            user.company = Some(company.clone());
        }
        if let Some(skills) = &patch.skills {
            user.skills = Some(skills.clone());
        }
        if let Some(bio) = &patch.bio {
            user.bio = Some(bio.clone());
        }
        if let Some(avatar) = &patch.avatar {
            user.avatar = avatar.clone();
        }
        apply_role_fields(&mut user);
        user.updated_at = Utc::now();

        sqlx::query(
            "UPDATE users SET name = ?, email = ?, role = ?, company = ?, skills = ?, bio = ?, avatar = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.company)
        .bind(user.skills.clone().map(Json))
        .bind(&user.bio)
        .bind(&user.avatar)
        .bind(user.updated_at)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(duplicate_email)?;

        tx.commit().await?;
        Ok(Some(user))
    }

    /// Delete a user. Returns whether a row was removed.
    pub async fn delete_user(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::test_support::repository;
    use super::*;

    fn new_user(name: &str, email: &str, role: Role) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            role,
            company: Some("Acme".to_string()),
            skills: Some(vec!["Rust".to_string()]),
            bio: None,
            avatar: None,
            password_hash: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_timestamps_and_avatar() {
        let (repo, _dir) = repository().await;
        let user = repo.create_user(new_user("Ann", "ann@x.com", Role::Client)).await.unwrap();

        assert!(!user.id.is_empty());
        assert_eq!(user.created_at, user.updated_at);
        assert_eq!(user.avatar, default_avatar("ann@x.com"));
        assert_eq!(user.company.as_deref(), Some("Acme"));
        assert!(user.skills.is_none());

        let fetched = repo.get_user(&user.id).await.unwrap().unwrap();
        assert_eq!(fetched, user);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (repo, _dir) = repository().await;
        repo.create_user(new_user("Ann", "ann@x.com", Role::Client)).await.unwrap();
        let err = repo
            .create_user(new_user("Other Ann", "ann@x.com", Role::Developer))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg == "User already exists"));
    }

    #[tokio::test]
    async fn test_list_filters_by_role_in_insertion_order() {
        let (repo, _dir) = repository().await;
        repo.create_user(new_user("Zed", "zed@x.com", Role::Developer)).await.unwrap();
        repo.create_user(new_user("Ann", "ann@x.com", Role::Client)).await.unwrap();
        repo.create_user(new_user("Bob", "bob@x.com", Role::Developer)).await.unwrap();

        let developers = repo.list_users(Some(Role::Developer)).await.unwrap();
        let names: Vec<_> = developers.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Zed", "Bob"]);
        assert_eq!(repo.list_users(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_merges_and_drops_role_fields() {
        let (repo, _dir) = repository().await;
        let user = repo.create_user(new_user("Ann", "ann@x.com", Role::Client)).await.unwrap();

        let patch = UserPatch {
            role: Some(Role::Developer),
            skills: Some(vec!["Go".to_string()]),
            ..Default::default()
        };
        let updated = repo.update_user(&user.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.name, "Ann");
        assert_eq!(updated.role, Role::Developer);
        assert!(updated.company.is_none());
        assert_eq!(updated.skills, Some(vec!["Go".to_string()]));
        assert!(updated.updated_at >= user.updated_at);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let (repo, _dir) = repository().await;
        let patch = UserPatch {
            name: Some("Ghost".to_string()),
            ..Default::default()
        };
        assert!(repo.update_user("missing", &patch).await.unwrap().is_none());
        assert!(!repo.delete_user("missing").await.unwrap());
        assert!(repo.list_users(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let (repo, _dir) = repository().await;
        let user = repo.create_user(new_user("Ann", "ann@x.com", Role::Admin)).await.unwrap();
        let found = repo.find_user_by_email("ann@x.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(repo.find_user_by_email("nobody@x.com").await.unwrap().is_none());
    }
}
