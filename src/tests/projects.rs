use serde_json::{json, Value};

use super::{field_errors, send, TestFixture};

fn ids(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}

fn new_project() -> Value {
    json!({
        "title": "Inventory Dashboard",
        "description": "Internal dashboard for stock levels",
        "client": { "id": "3", "name": "Sarah W.", "email": "sarah@innovationlabs.com" },
        "budget": 12000,
        "deadline": "2025-03-01"
    })
}

#[tokio::test]
async fn test_list_projects() {
    let fixture = TestFixture::new().await;

    let (status, body) = send(fixture.get("/api/projects")).await;

    assert_eq!(status, 200);
    assert_eq!(body["message"], "Projects retrieved successfully");
    assert_eq!(ids(&body), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_filter_by_status() {
    let fixture = TestFixture::new().await;

    let (status, body) = send(fixture.get("/api/projects?status=active")).await;

    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec!["1", "2"]);
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|p| p["status"] == "active"));
}

#[tokio::test]
async fn test_filter_by_client_and_developer() {
    let fixture = TestFixture::new().await;

    let (_, body) = send(fixture.get("/api/projects?clientId=1")).await;
    assert_eq!(ids(&body), vec!["1", "3"]);

    let (_, body) = send(fixture.get("/api/projects?developerId=2&status=completed")).await;
    assert_eq!(ids(&body), vec!["3"]);

    let (_, body) = send(fixture.get("/api/projects/client/3")).await;
    assert_eq!(ids(&body), vec!["2"]);

    let (_, body) = send(fixture.get("/api/projects/developer/2")).await;
    assert_eq!(ids(&body), vec!["1", "3"]);

    let (status, body) = send(fixture.get("/api/projects/developer/999")).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_invalid_status_filter() {
    let fixture = TestFixture::new().await;

    let (status, body) = send(fixture.get("/api/projects?status=paused")).await;

    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_get_project() {
    let fixture = TestFixture::new().await;

    let (status, body) = send(fixture.get("/api/projects/1")).await;

    assert_eq!(status, 200);
    assert_eq!(body["data"]["title"], "E-commerce Platform");
    assert_eq!(body["data"]["client"]["name"], "John Smith");
    assert_eq!(body["data"]["developers"][0]["id"], "2");
    assert_eq!(body["data"]["deadline"], "2024-08-15");

    let (status, body) = send(fixture.get("/api/projects/999")).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Project not found");
}

#[tokio::test]
async fn test_create_project_defaults() {
    let fixture = TestFixture::new().await;

    let (status, body) = send(fixture.post("/api/projects").json(&new_project())).await;

    assert_eq!(status, 201);
    assert_eq!(body["message"], "Project created successfully");
    let project = &body["data"];
    assert_eq!(project["status"], "draft");
    assert_eq!(project["progress"], 0);
    assert_eq!(project["spent"], 0.0);
    assert_eq!(project["developers"], json!([]));
    assert_eq!(project["tasks"], json!([]));
    // Client snapshot comes from the stored user.
    assert_eq!(project["client"]["name"], "Sarah Wilson");

    let (_, body) = send(fixture.get("/api/projects?clientId=3")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_project_validation() {
    let fixture = TestFixture::new().await;

    let (status, body) = send(fixture.post("/api/projects").json(&json!({
        "title": "Ab",
        "description": "short",
        "budget": -5,
        "deadline": "someday",
        "status": "paused",
        "progress": 140
    })))
    .await;

    assert_eq!(status, 400);
    let fields: Vec<_> = field_errors(&body).into_iter().map(|(f, _)| f).collect();
    for field in ["title", "description", "client", "budget", "deadline", "status", "progress"] {
        assert!(fields.contains(&field.to_string()), "missing error for {}", field);
    }
}

#[tokio::test]
async fn test_update_unknown_project() {
    let fixture = TestFixture::new().await;

    let (status, body) = send(
        fixture
            .put("/api/projects/999")
            .json(&json!({ "status": "active" })),
    )
    .await;

    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Project not found");
}

#[tokio::test]
async fn test_update_project_is_repeatable() {
    let fixture = TestFixture::new().await;
    let patch = json!({ "progress": 80, "spent": 11000 });

    let (status, first) = send(fixture.put("/api/projects/1").json(&patch)).await;
    assert_eq!(status, 200);
    let (status, second) = send(fixture.put("/api/projects/1").json(&patch)).await;
    assert_eq!(status, 200);

    assert_eq!(first["data"]["progress"], 80);
    assert_eq!(second["data"]["progress"], 80);
    assert_eq!(second["data"]["spent"], 11000.0);
    assert_eq!(second["data"]["title"], first["data"]["title"]);
}

#[tokio::test]
async fn test_any_status_transition_accepted() {
    let fixture = TestFixture::new().await;

    let (status, body) = send(
        fixture
            .put("/api/projects/3")
            .json(&json!({ "status": "draft" })),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "draft");
}

#[tokio::test]
async fn test_spending_over_budget_is_stored() {
    let fixture = TestFixture::new().await;

    let (status, body) = send(
        fixture
            .put("/api/projects/2")
            .json(&json!({ "spent": 9000 })),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["data"]["budget"], 8000.0);
    assert_eq!(body["data"]["spent"], 9000.0);
}

#[tokio::test]
async fn test_delete_project() {
    let fixture = TestFixture::new().await;

    let (status, body) = send(fixture.delete("/api/projects/2")).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Project deleted successfully");

    let (status, _) = send(fixture.get("/api/projects/2")).await;
    assert_eq!(status, 404);

    let (status, _) = send(fixture.delete("/api/projects/2")).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_assign_developer_twice() {
    let fixture = TestFixture::new().await;

    for _ in 0..2 {
        let (status, body) = send(
            fixture
                .post("/api/projects/1/assign-developer")
                .json(&json!({ "developerId": "2" })),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["message"], "Developer assigned to project successfully");
    }

    let (_, body) = send(fixture.get("/api/projects/1")).await;
    let developers: Vec<_> = body["data"]["developers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_str().unwrap())
        .collect();
    assert_eq!(developers, vec!["2"]);
}

#[tokio::test]
async fn test_assign_developer_to_new_project() {
    let fixture = TestFixture::new().await;

    let (status, body) = send(
        fixture
            .post("/api/projects/2/assign-developer")
            .json(&json!({ "developerId": "2" })),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["data"]["developers"][0]["name"], "Jane Developer");
    assert_eq!(body["data"]["developers"][0]["email"], "jane@dev.com");
}

#[tokio::test]
async fn test_assign_developer_errors() {
    let fixture = TestFixture::new().await;

    let (status, body) = send(
        fixture
            .post("/api/projects/1/assign-developer")
            .json(&json!({ "developerId": "1" })),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "User is not a developer");

    let (status, body) = send(
        fixture
            .post("/api/projects/1/assign-developer")
            .json(&json!({ "developerId": "999" })),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Developer not found");

    let (status, body) = send(
        fixture
            .post("/api/projects/999/assign-developer")
            .json(&json!({ "developerId": "2" })),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Project not found");

    let (status, body) = send(
        fixture
            .post("/api/projects/1/assign-developer")
            .json(&json!({})),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(field_errors(&body)[0].0, "developerId");
}

#[tokio::test]
async fn test_remove_developer() {
    let fixture = TestFixture::new().await;

    let (status, body) = send(fixture.delete("/api/projects/1/remove-developer/2")).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["developers"], json!([]));

    // Removing again leaves the project as it is.
    let (status, body) = send(fixture.delete("/api/projects/1/remove-developer/2")).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["developers"], json!([]));

    let (status, _) = send(fixture.delete("/api/projects/999/remove-developer/2")).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_refresh_snapshots_after_profile_change() {
    let fixture = TestFixture::new().await;

    let (status, _) = send(
        fixture
            .put("/api/users/2")
            .json(&json!({ "name": "Jane Rustacean" })),
    )
    .await;
    assert_eq!(status, 200);

    // Snapshots are copies until refreshed.
    let (_, body) = send(fixture.get("/api/projects/1")).await;
    assert_eq!(body["data"]["developers"][0]["name"], "Jane Developer");

    let (status, body) = send(fixture.post("/api/projects/1/refresh-snapshots")).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["developers"][0]["name"], "Jane Rustacean");
    assert_eq!(body["data"]["client"]["name"], "John Smith");
}

#[tokio::test]
async fn test_developer_assignment_needs_admin() {
    let fixture = TestFixture::secured().await;
    let token = fixture.token_for("john@techsolutions.com", "client").await;

    let (status, _) = send(
        fixture
            .post("/api/projects/2/assign-developer")
            .bearer_auth(&token)
            .json(&json!({ "developerId": "2" })),
    )
    .await;

    assert_eq!(status, 403);
}
