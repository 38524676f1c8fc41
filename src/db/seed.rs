//! Demo data loaded into an empty database.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use super::notifications::insert_notification;
use super::projects::insert_project;
use super::repository::Repository;
use super::users::insert_user;
use crate::errors::AppError;
use crate::models::{
    default_avatar, ClientSnapshot, DeveloperSnapshot, Notification, NotificationType, Priority,
    Project, ProjectStatus, Role, Task, User,
};

/// Password shared by every seeded account.
pub const DEMO_PASSWORD: &str = "demo123";

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn user(
    id: &str,
    name: &str,
    email: &str,
    role: Role,
    created_at: DateTime<Utc>,
    password_hash: &str,
) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        company: None,
        skills: None,
        bio: None,
        avatar: default_avatar(email),
        created_at,
        updated_at: created_at,
        password_hash: Some(password_hash.to_string()),
    }
}

fn demo_users(password_hash: &str) -> Vec<User> {
    let mut john = user("1", "John Smith", "john@techsolutions.com", Role::Client, at(2024, 4, 2), password_hash);
    john.company = Some("Tech Solutions Inc.".to_string());

    let mut jane = user("2", "Jane Developer", "jane@dev.com", Role::Developer, at(2024, 5, 3), password_hash);
    jane.skills = Some(
        ["React", "Node.js", "TypeScript", "Python"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    jane.bio = Some("Full-stack developer with 5+ years experience in modern web technologies".to_string());

    let mut sarah = user("3", "Sarah Wilson", "sarah@innovationlabs.com", Role::Client, at(2024, 5, 10), password_hash);
    sarah.company = Some("Innovation Labs".to_string());

    let admin = user("4", "Admin User", "admin@bluespace.tech", Role::Admin, at(2024, 6, 1), password_hash);

    let mut demo = user("5", "Demo Client", "demo@bluespace.tech", Role::Client, at(2024, 6, 15), password_hash);
    demo.company = Some("Bluespace Demo".to_string());

    vec![john, jane, sarah, admin, demo]
}

fn task(id: &str, title: &str, completed: bool, assigned_to: Option<&str>) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        completed,
        assigned_to: assigned_to.map(String::from),
    }
}

fn demo_projects(users: &[User]) -> Vec<Project> {
    let find = |id: &str| users.iter().find(|u| u.id == id);
    let client = |id: &str| find(id).map(ClientSnapshot::from);
    let developer = |id: &str| find(id).map(DeveloperSnapshot::from);

    let mut projects = Vec::new();

    if let (Some(john), Some(jane)) = (client("1"), developer("2")) {
        projects.push(Project {
            id: "1".to_string(),
            title: "E-commerce Platform".to_string(),
            description: "Modern e-commerce platform with React and Node.js".to_string(),
            status: ProjectStatus::Active,
            client: john.clone(),
            developers: vec![jane.clone()],
            budget: 15000.0,
            spent: 9750.0,
            deadline: date(2024, 8, 15),
            progress: 65,
            tasks: vec![
                task("1", "Design product catalog", true, Some("2")),
                task("2", "Implement checkout flow", false, Some("2")),
                task("3", "Payment gateway integration", false, None),
            ],
            created_at: at(2024, 6, 1),
            updated_at: at(2024, 6, 1),
        });
        projects.push(Project {
            id: "3".to_string(),
            title: "Company Website Redesign".to_string(),
            description: "Responsive marketing site with a headless CMS".to_string(),
            status: ProjectStatus::Completed,
            client: john,
            developers: vec![jane],
            budget: 5000.0,
            spent: 4800.0,
            deadline: date(2024, 5, 30),
            progress: 100,
            tasks: vec![task("1", "Launch", true, Some("2"))],
            created_at: at(2024, 4, 10),
            updated_at: at(2024, 4, 10),
        });
    }

    if let Some(sarah) = client("3") {
        projects.push(Project {
            id: "2".to_string(),
            title: "Mobile App MVP".to_string(),
            description: "Cross-platform mobile application using React Native".to_string(),
            status: ProjectStatus::Active,
            client: sarah,
            developers: vec![],
            budget: 8000.0,
            spent: 2400.0,
            deadline: date(2024, 7, 20),
            progress: 30,
            tasks: vec![task("1", "User authentication screens", false, None)],
            created_at: at(2024, 5, 15),
            updated_at: at(2024, 5, 15),
        });
    }

    projects.sort_by(|a, b| a.id.cmp(&b.id));
    projects
}

fn demo_notifications(now: DateTime<Utc>) -> Vec<Notification> {
    let notification = |id: &str,
                        kind: NotificationType,
                        title: &str,
                        description: &str,
                        age: Duration,
                        read: bool,
                        priority: Priority| Notification {
        id: id.to_string(),
        kind,
        title: title.to_string(),
        description: description.to_string(),
        timestamp: now - age,
        read,
        priority,
        user_id: "2".to_string(),
        metadata: None,
    };

    vec![
        notification(
            "1",
            NotificationType::Project,
            "New Project Assignment",
            "You have been assigned to the E-commerce Platform project",
            Duration::hours(2),
            false,
            Priority::High,
        ),
        notification(
            "2",
            NotificationType::Message,
            "Client Message",
            "John Smith sent you a message about the checkout flow",
            Duration::hours(4),
            false,
            Priority::Medium,
        ),
        notification(
            "3",
            NotificationType::Deadline,
            "Deadline Reminder",
            "Mobile App MVP milestone is due in 3 days",
            Duration::days(1),
            true,
            Priority::High,
        ),
        notification(
            "4",
            NotificationType::Payment,
            "Payment Received",
            "Payment of $2,500 received for Company Website Redesign",
            Duration::days(2),
            true,
            Priority::Low,
        ),
    ]
}

impl Repository {
    // ==================== DEMO DATA ====================

    /// Load the demo users, projects and notifications when no user exists.
    /// Returns whether anything was inserted.
    pub async fn seed_demo_data(&self, password_hash: &str) -> Result<bool, AppError> {
        let mut tx = self.begin_write().await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            return Ok(false);
        }

        let users = demo_users(password_hash);
        for user in &users {
            insert_user(&mut tx, user).await?;
        }
        for project in demo_projects(&users) {
            insert_project(&mut tx, &project).await?;
        }
        for notification in demo_notifications(Utc::now()) {
            insert_notification(&mut tx, &notification).await?;
        }

        tx.commit().await?;
        tracing::info!(users = users.len(), "Seeded demo data");
        Ok(true)
    }
}
