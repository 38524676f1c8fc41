//! Analytics response shapes.

use serde::Serialize;

use super::{ProjectStatus, Role};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: usize,
    pub total_clients: usize,
    pub total_developers: usize,
    pub total_admins: usize,
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_projects: usize,
    /// Sum of all project budgets
    pub total_revenue: f64,
    /// Percent change in projects created this month versus last month
    pub monthly_growth: f64,
    pub average_project_value: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: ProjectStatus,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyProjects {
    /// `YYYY-MM`
    pub month: String,
    pub count: usize,
    pub total_budget: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientRanking {
    pub id: String,
    pub name: String,
    pub project_count: usize,
    pub total_budget: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeveloperRanking {
    pub id: String,
    pub name: String,
    pub project_count: usize,
    /// Budget share, split evenly between a project's developers
    pub total_earnings: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAnalytics {
    pub projects_by_status: Vec<StatusCount>,
    pub projects_by_month: Vec<MonthlyProjects>,
    pub top_clients: Vec<ClientRanking>,
    pub top_developers: Vec<DeveloperRanking>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoleCount {
    pub role: Role,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyUsers {
    pub month: String,
    pub new_users: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserAnalytics {
    pub users_by_role: Vec<RoleCount>,
    pub user_growth: Vec<MonthlyUsers>,
}
