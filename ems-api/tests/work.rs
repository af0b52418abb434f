//! Tasks, helpdesk and documents.

#[macro_use]
extern crate time_test;

mod common;

use rocket::http::{ContentType, Status};
use rocket::tokio;
use serde_json::{Value, json};

use common::{acme, bearer, client};

#[tokio::test]
async fn test_task_assignment_rules() {
    let client = client().await;
    time_test!("test_task_assignment_rules");
    let acme = acme(&client).await;

    let task = |assignee: i64| {
        json!({
            "title": "Ship release",
            "assigned_to_id": assignee,
            "due_date": "2025-03-20",
            "priority": "high"
        })
    };

    let response = client
        .post("/api/1/tasks")
        .header(bearer(&acme.manager))
        .json(&task(acme.seller_id))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .post("/api/1/tasks")
        .header(bearer(&acme.engineer))
        .json(&task(acme.engineer_id))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .post("/api/1/tasks")
        .header(bearer(&acme.manager))
        .json(&task(acme.engineer_id))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let created: Value = response.into_json().await.unwrap();
    assert_eq!(created["status"], "todo");
    assert_eq!(created["assigned_to_name"], "Test eli");
    let id = created["id"].as_i64().unwrap();

    // Only the assignee moves the status, even HR cannot.
    let response = client
        .patch(format!("/api/1/tasks/{id}/status"))
        .header(bearer(&acme.hr))
        .json(&json!({ "status": "completed" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .patch(format!("/api/1/tasks/{id}/status"))
        .header(bearer(&acme.engineer))
        .json(&json!({ "status": "completed" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let response = client
        .get("/api/1/notifications")
        .header(bearer(&acme.hr))
        .dispatch()
        .await;
    let feed: Value = response.into_json().await.unwrap();
    assert!(
        feed.as_array()
            .unwrap()
            .iter()
            .any(|n| n["message"] == "Test eli completed the task: 'Ship release'.")
    );

    let response = client
        .get("/api/1/tasks")
        .header(bearer(&acme.seller))
        .dispatch()
        .await;
    let seller_tasks: Value = response.into_json().await.unwrap();
    assert!(seller_tasks.as_array().unwrap().is_empty());

    let response = client
        .delete(format!("/api/1/tasks/{id}"))
        .header(bearer(&acme.manager))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
}

#[tokio::test]
async fn test_helpdesk_access() {
    let client = client().await;
    time_test!("test_helpdesk_access");
    let acme = acme(&client).await;

    let response = client
        .post("/api/1/helpdesk/tickets")
        .header(bearer(&acme.engineer))
        .json(&json!({ "subject": "VPN", "description": "Cannot connect" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let ticket: Value = response.into_json().await.unwrap();
    assert_eq!(ticket["status"], "open");
    assert_eq!(ticket["category"], "General");
    let id = ticket["id"].as_i64().unwrap();

    let response = client
        .get(format!("/api/1/helpdesk/tickets/{id}"))
        .header(bearer(&acme.seller))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .post(format!("/api/1/helpdesk/tickets/{id}/replies"))
        .header(bearer(&acme.manager))
        .json(&json!({ "reply_text": "Looking into it" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    let response = client
        .put(format!("/api/1/helpdesk/tickets/{id}/status"))
        .header(bearer(&acme.manager))
        .json(&json!({ "status": "resolved" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .put(format!("/api/1/helpdesk/tickets/{id}/status"))
        .header(bearer(&acme.hr))
        .json(&json!({ "status": "archived" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);

    let response = client
        .put(format!("/api/1/helpdesk/tickets/{id}/status"))
        .header(bearer(&acme.hr))
        .json(&json!({ "status": "resolved" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let response = client
        .get(format!("/api/1/helpdesk/tickets/{id}"))
        .header(bearer(&acme.engineer))
        .dispatch()
        .await;
    let detail: Value = response.into_json().await.unwrap();
    assert_eq!(detail["status"], "resolved");
    assert_eq!(detail["replies"][0]["reply_text"], "Looking into it");
}

#[tokio::test]
async fn test_document_upload_and_visibility() {
    let client = client().await;
    time_test!("test_document_upload_and_visibility");
    let acme = acme(&client).await;

    // An employee asking to upload for someone else still uploads for
    // themselves.
    let response = client
        .post(format!(
            "/api/1/documents/upload?document_type=ID&file_name=../../passport.pdf&employee_id={}",
            acme.seller_id
        ))
        .header(bearer(&acme.engineer))
        .header(ContentType::Binary)
        .body(b"%PDF-1.4 fake".to_vec())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let document: Value = response.into_json().await.unwrap();
    assert_eq!(document["employee_id"], acme.engineer_id);
    assert_eq!(document["document_name"], "passport.pdf");
    assert!(document["file_url"].as_str().unwrap().ends_with("_passport.pdf"));

    let response = client
        .post("/api/1/documents/upload?document_type=Policy&file_name=handbook.pdf")
        .header(bearer(&acme.hr))
        .body(b"handbook".to_vec())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    let count = |body: Value| body.as_array().unwrap().len();
    let response = client
        .get("/api/1/documents")
        .header(bearer(&acme.seller))
        .dispatch()
        .await;
    assert_eq!(count(response.into_json().await.unwrap()), 1);

    let response = client
        .get("/api/1/documents")
        .header(bearer(&acme.hr))
        .dispatch()
        .await;
    assert_eq!(count(response.into_json().await.unwrap()), 2);

    let response = client
        .delete(format!("/api/1/documents/{}", document["id"]))
        .header(bearer(&acme.engineer))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .delete(format!("/api/1/documents/{}", document["id"]))
        .header(bearer(&acme.hr))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
}

#[tokio::test]
async fn test_org_chart_and_dashboard() {
    let client = client().await;
    time_test!("test_org_chart_and_dashboard");
    let acme = acme(&client).await;

    let response = client
        .get("/api/1/org-chart")
        .header(bearer(&acme.engineer))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let root: Value = response.into_json().await.unwrap();
    assert_eq!(root["role"], "admin");
    let children = root["children"].as_array().unwrap();
    let manager = children
        .iter()
        .find(|c| c["id"] == acme.manager_id)
        .unwrap();
    assert_eq!(manager["children"][0]["id"], acme.engineer_id);

    let response = client
        .get("/api/1/dashboard/stats")
        .header(bearer(&acme.engineer))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let stats: Value = response.into_json().await.unwrap();
    assert_eq!(stats["my_tasks_pending"], 0);

    let response = client
        .get("/api/1/reports/summary")
        .header(bearer(&acme.manager))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .get("/api/1/reports/summary")
        .header(bearer(&acme.hr))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
}

#[tokio::test]
async fn test_onboarding_checklist_access() {
    let client = client().await;
    time_test!("test_onboarding_checklist_access");
    let acme = acme(&client).await;

    let path = format!("/api/1/onboarding/{}", acme.engineer_id);
    let response = client.get(path.as_str()).header(bearer(&acme.engineer)).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let empty: Value = response.into_json().await.unwrap();
    assert_eq!(empty, json!([]));

    let response = client
        .post("/api/1/onboarding")
        .header(bearer(&acme.engineer))
        .json(&json!({
            "employee_id": acme.engineer_id,
            "tasks": [
                {"text": "Sign contract", "completed": true},
                {"text": "Set up laptop"}
            ]
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["message"], "Checklist updated successfully.");

    let response = client.get(path.as_str()).header(bearer(&acme.manager)).dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let items: Value = response.into_json().await.unwrap();
    assert_eq!(items[0]["completed"], true);
    assert_eq!(items[1]["text"], "Set up laptop");
    assert_eq!(items[1]["completed"], false);

    let response = client.get(path.as_str()).header(bearer(&acme.seller)).dispatch().await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .post("/api/1/onboarding")
        .header(bearer(&acme.manager))
        .json(&json!({"employee_id": acme.seller_id, "tasks": []}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .get("/api/1/onboarding/9999")
        .header(bearer(&acme.hr))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
}
