//! Aggregations behind the analytics endpoints.
//!
//! Pure functions over store snapshots, so they can be tested without a
//! database.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Months, Utc};

use crate::models::{
    ClientRanking, DashboardStats, DeveloperRanking, MonthlyProjects, MonthlyUsers, Project,
    ProjectAnalytics, ProjectStatus, Role, RoleCount, StatusCount, User, UserAnalytics,
};

/// How many entries the top client/developer lists keep.
pub const TOP_N: usize = 5;

fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Percent change from `previous` to `current`; 100 when starting from zero.
fn growth(previous: usize, current: usize) -> f64 {
    match (previous, current) {
        (0, 0) => 0.0,
        (0, _) => 100.0,
        (p, c) => round_to((c as f64 - p as f64) / p as f64 * 100.0, 1),
    }
}

pub fn dashboard_stats(users: &[User], projects: &[Project], now: DateTime<Utc>) -> DashboardStats {
    let count_role = |role: Role| users.iter().filter(|u| u.role == role).count();
    let count_status = |status: ProjectStatus| projects.iter().filter(|p| p.status == status).count();

    let this_month = month_key(now);
    let last_month = now
        .checked_sub_months(Months::new(1))
        .map(month_key)
        .unwrap_or_default();
    let created_in = |month: &str| {
        projects
            .iter()
            .filter(|p| month_key(p.created_at) == month)
            .count()
    };

    let total_revenue: f64 = projects.iter().map(|p| p.budget).sum();
    let average_project_value = if projects.is_empty() {
        0.0
    } else {
        round_to(total_revenue / projects.len() as f64, 2)
    };

    DashboardStats {
        total_users: users.len(),
        total_clients: count_role(Role::Client),
        total_developers: count_role(Role::Developer),
        total_admins: count_role(Role::Admin),
        total_projects: projects.len(),
        active_projects: count_status(ProjectStatus::Active),
        completed_projects: count_status(ProjectStatus::Completed),
        total_revenue,
        monthly_growth: growth(created_in(&last_month), created_in(&this_month)),
        average_project_value,
    }
}

pub fn project_analytics(projects: &[Project]) -> ProjectAnalytics {
    let projects_by_status = ProjectStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: projects.iter().filter(|p| p.status == status).count(),
        })
        .collect();

    let mut months: BTreeMap<String, MonthlyProjects> = BTreeMap::new();
    for project in projects {
        let month = month_key(project.created_at);
        let entry = months.entry(month.clone()).or_insert(MonthlyProjects {
            month,
            count: 0,
            total_budget: 0.0,
        });
        entry.count += 1;
        entry.total_budget += project.budget;
    }

    let mut clients: HashMap<&str, ClientRanking> = HashMap::new();
    for project in projects {
        let entry = clients
            .entry(project.client.id.as_str())
            .or_insert_with(|| ClientRanking {
                id: project.client.id.clone(),
                name: project.client.name.clone(),
                project_count: 0,
                total_budget: 0.0,
            });
        entry.project_count += 1;
        entry.total_budget += project.budget;
    }
    let mut top_clients: Vec<_> = clients.into_values().collect();
    top_clients.sort_by(|a, b| {
        b.project_count
            .cmp(&a.project_count)
            .then(b.total_budget.total_cmp(&a.total_budget))
            .then_with(|| a.id.cmp(&b.id))
    });
    top_clients.truncate(TOP_N);

    let mut developers: HashMap<&str, DeveloperRanking> = HashMap::new();
    for project in projects {
        if project.developers.is_empty() {
            continue;
        }
        let share = project.budget / project.developers.len() as f64;
        for developer in &project.developers {
            let entry = developers
                .entry(developer.id.as_str())
                .or_insert_with(|| DeveloperRanking {
                    id: developer.id.clone(),
                    name: developer.name.clone(),
                    project_count: 0,
                    total_earnings: 0.0,
                });
            entry.project_count += 1;
            entry.total_earnings += share;
        }
    }
    let mut top_developers: Vec<_> = developers.into_values().collect();
    top_developers.sort_by(|a, b| {
        b.project_count
            .cmp(&a.project_count)
            .then(b.total_earnings.total_cmp(&a.total_earnings))
            .then_with(|| a.id.cmp(&b.id))
    });
    top_developers.truncate(TOP_N);
    for developer in &mut top_developers {
        developer.total_earnings = round_to(developer.total_earnings, 2);
    }

    ProjectAnalytics {
        projects_by_status,
        projects_by_month: months.into_values().collect(),
        top_clients,
        top_developers,
    }
}

pub fn user_analytics(users: &[User]) -> UserAnalytics {
    let users_by_role = Role::ALL
        .into_iter()
        .map(|role| RoleCount {
            role,
            count: users.iter().filter(|u| u.role == role).count(),
        })
        .collect();

    let mut months: BTreeMap<String, usize> = BTreeMap::new();
    for user in users {
        *months.entry(month_key(user.created_at)).or_default() += 1;
    }

    UserAnalytics {
        users_by_role,
        user_growth: months
            .into_iter()
            .map(|(month, new_users)| MonthlyUsers { month, new_users })
            .collect(),
    }
}
