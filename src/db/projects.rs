use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqliteConnection;

use super::repository::{project_from_row, Repository, PROJECT_COLUMNS};
use super::users::fetch_user;
use crate::errors::AppError;
use crate::models::{
    dedupe_developers, ClientSnapshot, DeveloperSnapshot, NewProject, Project, ProjectFilter,
    ProjectPatch, User,
};

async fn fetch_project(conn: &mut SqliteConnection, id: &str) -> Result<Option<Project>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {} FROM projects WHERE id = ?", PROJECT_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(project_from_row).transpose()
}

/// Re-copy the client snapshot from the live user, if it still exists.
async fn resolve_client(
    conn: &mut SqliteConnection,
    client: ClientSnapshot,
) -> Result<ClientSnapshot, sqlx::Error> {
    Ok(match fetch_user(conn, &client.id).await? {
        Some(user) => ClientSnapshot::from(&user),
        None => client,
    })
}

/// Re-copy developer snapshots from live users and drop duplicate ids.
async fn resolve_developers(
    conn: &mut SqliteConnection,
    developers: Vec<DeveloperSnapshot>,
) -> Result<Vec<DeveloperSnapshot>, sqlx::Error> {
    let mut resolved = Vec::with_capacity(developers.len());
    for developer in dedupe_developers(developers) {
        match fetch_user(conn, &developer.id).await? {
            Some(user) => resolved.push(DeveloperSnapshot::from(&user)),
            None => resolved.push(developer),
        }
    }
    Ok(resolved)
}

pub(super) async fn insert_project(conn: &mut SqliteConnection, project: &Project) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO projects (id, title, description, status, client_id, client, developers, budget, spent, deadline, progress, tasks, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    )
    .bind(&project.id)
    .bind(&project.title)
    .bind(&project.description)
    .bind(project.status.as_str())
    .bind(&project.client.id)
    .bind(Json(&project.client))
    .bind(Json(&project.developers))
    .bind(project.budget)
    .bind(project.spent)
    .bind(project.deadline)
    .bind(project.progress)
    .bind(Json(&project.tasks))
    .bind(project.created_at)
    .bind(project.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn write_project(conn: &mut SqliteConnection, project: &Project) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE projects SET title = ?, description = ?, status = ?, client_id = ?, client = ?, developers = ?, budget = ?, spent = ?, deadline = ?, progress = ?, tasks = ?, updated_at = ? WHERE id = ?"
    )
    .bind(&project.title)
    .bind(&project.description)
    .bind(project.status.as_str())
    .bind(&project.client.id)
    .bind(Json(&project.client))
    .bind(Json(&project.developers))
    .bind(project.budget)
    .bind(project.spent)
    .bind(project.deadline)
    .bind(project.progress)
    .bind(Json(&project.tasks))
    .bind(project.updated_at)
    .bind(&project.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

impl Repository {
    // ==================== PROJECT OPERATIONS ====================

    /// List projects in insertion order. All present filters must match.
    pub async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, AppError> {
        let rows = sqlx::query(&format!(
            r#"SELECT {} FROM projects
               WHERE (?1 IS NULL OR status = ?1)
                 AND (?2 IS NULL OR client_id = ?2)
                 AND (?3 IS NULL OR EXISTS (
                        SELECT 1 FROM json_each(projects.developers)
                        WHERE json_extract(json_each.value, '$.id') = ?3))
               ORDER BY rowid"#,
            PROJECT_COLUMNS
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.client_id.as_deref())
        .bind(filter.developer_id.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(project_from_row).collect::<Result<_, _>>()?)
    }

    /// Get a project by ID.
    pub async fn get_project(&self, id: &str) -> Result<Option<Project>, AppError> {
        let mut conn = self.pool.acquire().await?;
        Ok(fetch_project(&mut conn, id).await?)
    }

    /// Create a project. Snapshots of existing users are taken from the live records.
    pub async fn create_project(&self, new_project: NewProject) -> Result<Project, AppError> {
        let mut tx = self.begin_write().await?;

        let now = Utc::now();
        let project = Project {
            id: uuid::Uuid::new_v4().to_string(),
            title: new_project.title,
            description: new_project.description,
            status: new_project.status,
            client: resolve_client(&mut tx, new_project.client).await?,
            developers: resolve_developers(&mut tx, new_project.developers).await?,
            budget: new_project.budget,
            spent: new_project.spent,
            deadline: new_project.deadline,
            progress: new_project.progress,
            tasks: new_project.tasks,
            created_at: now,
            updated_at: now,
        };
        insert_project(&mut tx, &project).await?;
        tx.commit().await?;

        tracing::debug!(project_id = %project.id, client_id = %project.client.id, "Project created");
        Ok(project)
    }

    /// Shallow-merge `patch` over the stored project and refresh `updated_at`.
    pub async fn update_project(
        &self,
        id: &str,
        patch: &ProjectPatch,
    ) -> Result<Option<Project>, AppError> {
        let mut tx = self.begin_write().await?;

        let Some(mut project) = fetch_project(&mut tx, id).await? else {
            return Ok(None);
        };
        patch.apply_to(&mut project);
        if patch.client.is_some() {
            project.client = resolve_client(&mut tx, project.client).await?;
        }
        if patch.developers.is_some() {
            project.developers = resolve_developers(&mut tx, project.developers).await?;
        }
        project.updated_at = Utc::now();

        write_project(&mut tx, &project).await?;
        tx.commit().await?;
        Ok(Some(project))
    }

    /// Delete a project. Returns whether a row was removed.
    pub async fn delete_project(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append a developer snapshot. Already assigned developers leave the project untouched.
    pub async fn assign_developer(
        &self,
        project_id: &str,
        developer: &User,
    ) -> Result<Option<Project>, AppError> {
        let mut tx = self.begin_write().await?;

        let Some(mut project) = fetch_project(&mut tx, project_id).await? else {
            return Ok(None);
        };
        if project.has_developer(&developer.id) {
            return Ok(Some(project));
        }

        project.developers.push(DeveloperSnapshot::from(developer));
        project.updated_at = Utc::now();
        write_project(&mut tx, &project).await?;
        tx.commit().await?;

        tracing::debug!(project_id, developer_id = %developer.id, "Developer assigned");
        Ok(Some(project))
    }

    /// Remove a developer if assigned. `None` only when the project is unknown.
    pub async fn remove_developer(
        &self,
        project_id: &str,
        developer_id: &str,
    ) -> Result<Option<Project>, AppError> {
        let mut tx = self.begin_write().await?;

        let Some(mut project) = fetch_project(&mut tx, project_id).await? else {
            return Ok(None);
        };
        if !project.has_developer(developer_id) {
            return Ok(Some(project));
        }

        project.developers.retain(|d| d.id != developer_id);
        project.updated_at = Utc::now();
        write_project(&mut tx, &project).await?;
        tx.commit().await?;
        Ok(Some(project))
    }

    /// Re-copy client and developer snapshots from the live user records.
    pub async fn refresh_snapshots(&self, id: &str) -> Result<Option<Project>, AppError> {
        let mut tx = self.begin_write().await?;

        let Some(mut project) = fetch_project(&mut tx, id).await? else {
            return Ok(None);
        };
        project.client = resolve_client(&mut tx, project.client).await?;
        project.developers = resolve_developers(&mut tx, project.developers).await?;
        project.updated_at = Utc::now();

        write_project(&mut tx, &project).await?;
        tx.commit().await?;
        Ok(Some(project))
    }
}
