//! Project model and its request bodies.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{default_avatar, User};

/// Lifecycle status of a project. Any status may follow any other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Draft,
    Active,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Draft,
        ProjectStatus::Active,
        ProjectStatus::Completed,
        ProjectStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProjectStatus::Draft),
            "active" => Ok(ProjectStatus::Active),
            "completed" => Ok(ProjectStatus::Completed),
            "cancelled" => Ok(ProjectStatus::Cancelled),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Copy of the client's identity taken when the project was written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientSnapshot {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
}

impl From<&User> for ClientSnapshot {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

/// Copy of an assigned developer's identity and skills.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeveloperSnapshot {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl From<&User> for DeveloperSnapshot {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            skills: user.skills.clone().unwrap_or_default(),
        }
    }
}

/// A unit of work inside a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

/// A project commissioned by a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub client: ClientSnapshot,
    pub developers: Vec<DeveloperSnapshot>,
    pub budget: f64,
    /// Not checked against `budget`
    pub spent: f64,
    pub deadline: NaiveDate,
    pub progress: i64,
    pub tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn has_developer(&self, developer_id: &str) -> bool {
        self.developers.iter().any(|d| d.id == developer_id)
    }

    /// Whether spending has run past the budget.
    pub fn is_over_budget(&self) -> bool {
        self.spent > self.budget
    }
}

/// Embedded person as sent by clients; only `id` is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
}

impl SnapshotInput {
    fn email_or_empty(&self) -> String {
        self.email.clone().unwrap_or_default()
    }

    pub fn into_client(self, id: String) -> ClientSnapshot {
        let email = self.email_or_empty();
        ClientSnapshot {
            avatar: self.avatar.unwrap_or_else(|| default_avatar(&email)),
            id,
            name: self.name.unwrap_or_default(),
            email,
        }
    }

    pub fn into_developer(self, id: String) -> DeveloperSnapshot {
        let email = self.email_or_empty();
        DeveloperSnapshot {
            avatar: self.avatar.unwrap_or_else(|| default_avatar(&email)),
            id,
            name: self.name.unwrap_or_default(),
            email,
            skills: self.skills.unwrap_or_default(),
        }
    }
}

/// Task as sent by clients; ids are assigned when missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// Request body for `POST /api/projects`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub client: Option<SnapshotInput>,
    #[serde(default)]
    pub developers: Option<Vec<SnapshotInput>>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub spent: Option<f64>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub tasks: Option<Vec<TaskInput>>,
}

/// Request body for `PUT /api/projects/:id`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub client: Option<SnapshotInput>,
    #[serde(default)]
    pub developers: Option<Vec<SnapshotInput>>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub spent: Option<f64>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub tasks: Option<Vec<TaskInput>>,
}

/// Request body for `POST /api/projects/:id/assign-developer`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDeveloperRequest {
    #[serde(default)]
    pub developer_id: Option<String>,
}

/// Query string for `GET /api/projects`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub developer_id: Option<String>,
}

/// Field-equality filters; all present filters must match.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub client_id: Option<String>,
    pub developer_id: Option<String>,
}

/// A validated project ready to be stored.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub client: ClientSnapshot,
    pub developers: Vec<DeveloperSnapshot>,
    pub budget: f64,
    pub spent: f64,
    pub deadline: NaiveDate,
    pub progress: i64,
    pub tasks: Vec<Task>,
}

/// A validated partial update.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub client: Option<ClientSnapshot>,
    pub developers: Option<Vec<DeveloperSnapshot>>,
    pub budget: Option<f64>,
    pub spent: Option<f64>,
    pub deadline: Option<NaiveDate>,
    pub progress: Option<i64>,
    pub tasks: Option<Vec<Task>>,
}

impl ProjectPatch {
    /// Shallow-merge the present fields over `project`.
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(title) = &self.title {
            project.title = title.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(client) = &self.client {
            project.client = client.clone();
        }
        if let Some(developers) = &self.developers {
            project.developers = developers.clone();
        }
        if let Some(budget) = self.budget {
            project.budget = budget;
        }
        if let Some(spent) = self.spent {
            project.spent = spent;
        }
        if let Some(deadline) = self.deadline {
            project.deadline = deadline;
        }
        if let Some(progress) = self.progress {
            project.progress = progress;
        }
        if let Some(tasks) = &self.tasks {
            project.tasks = tasks.clone();
        }
    }
}

/// Drop later duplicates, keeping first occurrence order.
pub fn dedupe_developers(developers: Vec<DeveloperSnapshot>) -> Vec<DeveloperSnapshot> {
    let mut seen = std::collections::HashSet::new();
    developers
        .into_iter()
        .filter(|d| seen.insert(d.id.clone()))
        .collect()
}
