//! Rule sets for project bodies and list filters.

use uuid::Uuid;

use super::{Checker, FieldError, Validate};
use crate::errors::AppError;
use crate::models::{
    dedupe_developers, AssignDeveloperRequest, ClientSnapshot, CreateProjectRequest,
    DeveloperSnapshot, NewProject, ProjectFilter, ProjectListQuery, ProjectPatch, ProjectStatus,
    SnapshotInput, Task, TaskInput, UpdateProjectRequest,
};

const TITLE_REQUIRED: &str = "Title is required";
const TITLE_LENGTH: &str = "Title must be between 3 and 100 characters";
const DESCRIPTION_REQUIRED: &str = "Description is required";
const DESCRIPTION_LENGTH: &str = "Description must be between 10 and 1000 characters";
const CLIENT_REQUIRED: &str = "Client information is required";
const BUDGET_INVALID: &str = "Budget must be a positive number";
const SPENT_INVALID: &str = "Spent must be a positive number";
const DEADLINE_INVALID: &str = "Deadline must be a valid date";
const STATUS_INVALID: &str = "Status must be one of: draft, active, completed, cancelled";
const PROGRESS_RANGE: &str = "Progress must be between 0 and 100";
const PROGRESS_WHOLE: &str = "Progress must be a whole number";
const DEVELOPER_REQUIRED: &str = "Developer ID is required";
const TASK_TITLE_REQUIRED: &str = "Task title is required";

fn client(c: &mut Checker, input: Option<SnapshotInput>) -> Option<ClientSnapshot> {
    let input = match input {
        Some(input) => input,
        None => {
            c.fail("client", CLIENT_REQUIRED);
            return None;
        }
    };
    let id = c.present("client", input.id.as_deref(), CLIENT_REQUIRED)?;
    Some(input.into_client(id))
}

fn developers(c: &mut Checker, inputs: Vec<SnapshotInput>) -> Vec<DeveloperSnapshot> {
    let mut snapshots = Vec::with_capacity(inputs.len());
    for input in inputs {
        if let Some(id) = c.present("developers", input.id.as_deref(), DEVELOPER_REQUIRED) {
            snapshots.push(input.into_developer(id));
        }
    }
    dedupe_developers(snapshots)
}

fn tasks(c: &mut Checker, inputs: Vec<TaskInput>) -> Vec<Task> {
    let mut tasks = Vec::with_capacity(inputs.len());
    for input in inputs {
        let Some(title) = c.present("tasks", input.title.as_deref(), TASK_TITLE_REQUIRED) else {
            continue;
        };
        let id = input
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        tasks.push(Task {
            id,
            title,
            completed: input.completed.unwrap_or(false),
            assigned_to: input
                .assigned_to
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
        });
    }
    tasks
}

impl Validate for CreateProjectRequest {
    type Output = NewProject;

    fn validate(self) -> Result<NewProject, Vec<FieldError>> {
        let mut c = Checker::new();

        let title = c.present("title", self.title.as_deref(), TITLE_REQUIRED);
        c.length("title", self.title.as_deref(), 3, 100, TITLE_LENGTH);
        let description = c.present("description", self.description.as_deref(), DESCRIPTION_REQUIRED);
        c.length("description", self.description.as_deref(), 10, 1000, DESCRIPTION_LENGTH);
        let client = client(&mut c, self.client);
        let budget = c.range("budget", self.budget, 0.0, None, BUDGET_INVALID);
        let spent = match self.spent {
            Some(spent) => c.range("spent", Some(spent), 0.0, None, SPENT_INVALID),
            None => Some(0.0),
        };
        let deadline = c.date("deadline", self.deadline.as_deref(), DEADLINE_INVALID);
        let status = match self.status.as_deref() {
            Some(status) => c.one_of("status", Some(status), STATUS_INVALID),
            None => Some(ProjectStatus::Draft),
        };
        let progress = match self.progress {
            Some(p) => c.whole("progress", Some(p), 0, 100, PROGRESS_RANGE, PROGRESS_WHOLE),
            None => Some(0),
        };
        let developers = developers(&mut c, self.developers.unwrap_or_default());
        let tasks = tasks(&mut c, self.tasks.unwrap_or_default());

        c.finish(|| {
            Some(NewProject {
                title: title?,
                description: description?,
                status: status?,
                client: client?,
                developers,
                budget: budget?,
                spent: spent?,
                deadline: deadline?,
                progress: progress?,
                tasks,
            })
        })
    }
}

impl Validate for UpdateProjectRequest {
    type Output = ProjectPatch;

    fn validate(self) -> Result<ProjectPatch, Vec<FieldError>> {
        let mut c = Checker::new();

        if self.title.is_some() {
            c.length("title", self.title.as_deref(), 3, 100, TITLE_LENGTH);
        }
        if self.description.is_some() {
            c.length("description", self.description.as_deref(), 10, 1000, DESCRIPTION_LENGTH);
        }
        let client = match self.client {
            Some(input) => client(&mut c, Some(input)),
            None => None,
        };
        let budget = match self.budget {
            Some(b) => c.range("budget", Some(b), 0.0, None, BUDGET_INVALID),
            None => None,
        };
        let spent = match self.spent {
            Some(s) => c.range("spent", Some(s), 0.0, None, SPENT_INVALID),
            None => None,
        };
        let deadline = match self.deadline.as_deref() {
            Some(d) => c.date("deadline", Some(d), DEADLINE_INVALID),
            None => None,
        };
        let status = c.optional_one_of("status", self.status.as_deref(), STATUS_INVALID);
        let progress = match self.progress {
            Some(p) => c.whole("progress", Some(p), 0, 100, PROGRESS_RANGE, PROGRESS_WHOLE),
            None => None,
        };
        let developers = self.developers.map(|d| developers(&mut c, d));
        let tasks = self.tasks.map(|t| tasks(&mut c, t));

        c.finish(|| {
            Some(ProjectPatch {
                title: self.title.map(|t| t.trim().to_string()),
                description: self.description.map(|d| d.trim().to_string()),
                status,
                client,
                developers,
                budget,
                spent,
                deadline,
                progress,
                tasks,
            })
        })
    }
}

impl Validate for AssignDeveloperRequest {
    type Output = String;

    fn validate(self) -> Result<String, Vec<FieldError>> {
        let mut c = Checker::new();
        let id = c.present("developerId", self.developer_id.as_deref(), DEVELOPER_REQUIRED);
        c.finish(|| id)
    }
}

/// Parse `GET /api/projects` query parameters. Blank ids are ignored.
pub fn project_filter(query: ProjectListQuery) -> Result<ProjectFilter, AppError> {
    let mut c = Checker::new();
    let status = c.optional_one_of("status", query.status.as_deref(), STATUS_INVALID);
    let non_blank = |v: Option<String>| v.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    c.finish(|| {
        Some(ProjectFilter {
            status,
            client_id: non_blank(query.client_id),
            developer_id: non_blank(query.developer_id),
        })
    })
    .map_err(AppError::Validation)
}
