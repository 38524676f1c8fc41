//! User API endpoints.

use axum::extract::{Path, State};

use super::{acknowledged, created, success, ApiResult, AppQuery};
use crate::auth::{MaybeAuthUser, RequireAdmin};
use crate::errors::AppError;
use crate::models::{CreateUserRequest, UpdateUserRequest, User, UserListQuery};
use crate::validation::{role_filter, Validated};
use crate::AppState;

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

/// GET /api/users - List users, optionally by `role`.
pub async fn list_users(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UserListQuery>,
) -> ApiResult<Vec<User>> {
    let role = role_filter(query.role.as_deref())?;
    let users = state.repo.list_users(role).await?;
    success(users, "Users retrieved successfully")
}

/// GET /api/users/:id - Get a single user.
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    let user = state.repo.get_user(&id).await?.ok_or_else(user_not_found)?;
    success(user, "User found")
}

/// POST /api/users - Create a user without credentials.
pub async fn create_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Validated(new_user): Validated<CreateUserRequest>,
) -> ApiResult<User> {
    if state.repo.find_user_by_email(&new_user.email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let user = state.repo.create_user(new_user).await?;
    tracing::info!(user_id = %user.id, role = %user.role, "User created");
    created(user, "User created successfully")
}

/// PUT /api/users/:id - Update a user. Non-admins may only edit themselves
/// and may not change their role.
pub async fn update_user(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Path(id): Path<String>,
    Validated(patch): Validated<UpdateUserRequest>,
) -> ApiResult<User> {
    if let Some(caller) = caller.filter(|c| !c.is_admin()) {
        if caller.user_id != id {
            return Err(AppError::Forbidden(
                "You can only update your own profile".to_string(),
            ));
        }
        if patch.role.is_some_and(|role| role != caller.role) {
            return Err(AppError::Forbidden("Only admins can change roles".to_string()));
        }
    }

    let user = state
        .repo
        .update_user(&id, &patch)
        .await?
        .ok_or_else(user_not_found)?;
    success(user, "User updated successfully")
}

/// DELETE /api/users/:id - Delete a user.
pub async fn delete_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> ApiResult<()> {
    if !state.repo.delete_user(&id).await? {
        return Err(user_not_found());
    }
    tracing::info!(user_id = %id, "User deleted");
    acknowledged("User deleted successfully")
}

/// GET /api/users/role/:role - Users with one role.
pub async fn users_by_role(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> ApiResult<Vec<User>> {
    let role = role_filter(Some(&role))?;
    let users = state.repo.list_users(role).await?;
    let label = role.map(|r| r.as_str()).unwrap_or("user");
    success(users, format!("{}s retrieved successfully", label))
}
