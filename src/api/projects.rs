//! Project API endpoints.

use axum::extract::{Path, State};

use super::{acknowledged, created, success, ApiResult, AppQuery};
use crate::auth::RequireAdmin;
use crate::errors::AppError;
use crate::models::{
    AssignDeveloperRequest, CreateProjectRequest, Project, ProjectFilter, ProjectListQuery, Role,
    UpdateProjectRequest,
};
use crate::validation::{project_filter, Validated};
use crate::AppState;

fn project_not_found() -> AppError {
    AppError::NotFound("Project not found".to_string())
}

/// GET /api/projects - List projects filtered by `status`, `clientId`, `developerId`.
pub async fn list_projects(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProjectListQuery>,
) -> ApiResult<Vec<Project>> {
    let filter = project_filter(query)?;
    let projects = state.repo.list_projects(&filter).await?;
    success(projects, "Projects retrieved successfully")
}

/// GET /api/projects/:id - Get a single project.
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Project> {
    let project = state
        .repo
        .get_project(&id)
        .await?
        .ok_or_else(project_not_found)?;
    success(project, "Project found")
}

/// POST /api/projects - Create a project.
pub async fn create_project(
    State(state): State<AppState>,
    Validated(new_project): Validated<CreateProjectRequest>,
) -> ApiResult<Project> {
    let project = state.repo.create_project(new_project).await?;
    tracing::info!(project_id = %project.id, status = %project.status, "Project created");
    created(project, "Project created successfully")
}

/// PUT /api/projects/:id - Update a project. Any status may follow any other.
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Validated(patch): Validated<UpdateProjectRequest>,
) -> ApiResult<Project> {
    let project = state
        .repo
        .update_project(&id, &patch)
        .await?
        .ok_or_else(project_not_found)?;

    if project.is_over_budget() {
        tracing::warn!(
            project_id = %project.id,
            budget = project.budget,
            spent = project.spent,
            "Project spending exceeds budget"
        );
    }
    success(project, "Project updated successfully")
}

/// DELETE /api/projects/:id - Delete a project.
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    if !state.repo.delete_project(&id).await? {
        return Err(project_not_found());
    }
    tracing::info!(project_id = %id, "Project deleted");
    acknowledged("Project deleted successfully")
}

/// POST /api/projects/:id/assign-developer - Add a developer to a project.
pub async fn assign_developer(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
    Validated(developer_id): Validated<AssignDeveloperRequest>,
) -> ApiResult<Project> {
    if state.repo.get_project(&id).await?.is_none() {
        return Err(project_not_found());
    }

    let developer = state
        .repo
        .get_user(&developer_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Developer not found".to_string()))?;
    if developer.role != Role::Developer {
        return Err(AppError::BadRequest("User is not a developer".to_string()));
    }

    let project = state
        .repo
        .assign_developer(&id, &developer)
        .await?
        .ok_or_else(project_not_found)?;
    success(project, "Developer assigned to project successfully")
}

/// DELETE /api/projects/:id/remove-developer/:developerId - Remove a developer.
pub async fn remove_developer(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path((id, developer_id)): Path<(String, String)>,
) -> ApiResult<Project> {
    let project = state
        .repo
        .remove_developer(&id, &developer_id)
        .await?
        .ok_or_else(project_not_found)?;
    success(project, "Developer removed from project successfully")
}

/// POST /api/projects/:id/refresh-snapshots - Re-copy client and developer details.
pub async fn refresh_snapshots(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Project> {
    let project = state
        .repo
        .refresh_snapshots(&id)
        .await?
        .ok_or_else(project_not_found)?;
    success(project, "Project snapshots refreshed successfully")
}

/// GET /api/projects/client/:clientId - Projects of one client.
pub async fn projects_by_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> ApiResult<Vec<Project>> {
    let filter = ProjectFilter {
        client_id: Some(client_id),
        ..Default::default()
    };
    let projects = state.repo.list_projects(&filter).await?;
    success(projects, "Client projects retrieved successfully")
}

/// GET /api/projects/developer/:developerId - Projects a developer is assigned to.
pub async fn projects_by_developer(
    State(state): State<AppState>,
    Path(developer_id): Path<String>,
) -> ApiResult<Vec<Project>> {
    let filter = ProjectFilter {
        developer_id: Some(developer_id),
        ..Default::default()
    };
    let projects = state.repo.list_projects(&filter).await?;
    success(projects, "Developer projects retrieved successfully")
}
