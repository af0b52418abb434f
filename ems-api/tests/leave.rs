#[macro_use]
extern crate time_test;

mod common;

use rocket::http::Status;
use rocket::local::asynchronous::Client;
use rocket::tokio;
use serde_json::{Value, json};

use common::{acme, bearer, client};

async fn apply(client: &Client, token: &str, start: &str, end: &str) -> (Status, Value) {
    let response = client
        .post("/api/1/leave")
        .header(bearer(token))
        .json(&json!({
            "leave_type": "Casual",
            "start_date": start,
            "end_date": end,
            "reason": "family"
        }))
        .dispatch()
        .await;
    let status = response.status();
    (status, response.into_json().await.unwrap())
}

async fn visible_ids(client: &Client, token: &str) -> Vec<i64> {
    let response = client
        .get("/api/1/leave")
        .header(bearer(token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let rows: Value = response.into_json().await.unwrap();
    rows.as_array()
        .unwrap()
        .iter()
        .map(|r| r["requestor_id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_leave_visibility_follows_role() {
    let client = client().await;
    time_test!("test_leave_visibility_follows_role");
    let acme = acme(&client).await;

    apply(&client, &acme.engineer, "2025-04-01", "2025-04-02").await;
    apply(&client, &acme.seller, "2025-04-01", "2025-04-02").await;

    assert_eq!(visible_ids(&client, &acme.engineer).await, vec![acme.engineer_id]);
    assert_eq!(visible_ids(&client, &acme.seller).await, vec![acme.seller_id]);

    let manager_view = visible_ids(&client, &acme.manager).await;
    assert!(manager_view.contains(&acme.engineer_id));
    assert!(!manager_view.contains(&acme.seller_id));

    let hr_view = visible_ids(&client, &acme.hr).await;
    assert!(hr_view.contains(&acme.engineer_id));
    assert!(hr_view.contains(&acme.seller_id));
}

#[tokio::test]
async fn test_overlapping_leave_is_refused() {
    let client = client().await;
    time_test!("test_overlapping_leave_is_refused");
    let acme = acme(&client).await;

    let (status, first) = apply(&client, &acme.engineer, "2025-04-01", "2025-04-05").await;
    assert_eq!(status, Status::Created);
    assert_eq!(first["status"], "pending");

    let (status, body) = apply(&client, &acme.engineer, "2025-04-05", "2025-04-07").await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(
        body["error"],
        "You already have a pending or approved leave request for these dates."
    );

    // A rejected request no longer blocks its dates.
    let response = client
        .put(format!("/api/1/leave/{}/status", first["id"]))
        .header(bearer(&acme.hr))
        .json(&json!({ "status": "rejected" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let (status, _) = apply(&client, &acme.engineer, "2025-04-05", "2025-04-07").await;
    assert_eq!(status, Status::Created);
}

#[tokio::test]
async fn test_start_after_end_is_refused() {
    let client = client().await;
    time_test!("test_start_after_end_is_refused");
    let acme = acme(&client).await;

    let (status, body) = apply(&client, &acme.engineer, "2025-04-05", "2025-04-01").await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["error"], "Start date cannot be after end date.");
}

#[tokio::test]
async fn test_manager_acts_only_on_own_department() {
    let client = client().await;
    time_test!("test_manager_acts_only_on_own_department");
    let acme = acme(&client).await;

    let (_, engineer_leave) = apply(&client, &acme.engineer, "2025-04-01", "2025-04-01").await;
    let (_, seller_leave) = apply(&client, &acme.seller, "2025-04-01", "2025-04-01").await;

    let response = client
        .put(format!("/api/1/leave/{}/status", seller_leave["id"]))
        .header(bearer(&acme.manager))
        .json(&json!({ "status": "approved" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .put(format!("/api/1/leave/{}/status", engineer_leave["id"]))
        .header(bearer(&acme.manager))
        .json(&json!({ "status": "approved" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["status"], "approved");
    assert_eq!(body["action_by_id"], acme.manager_id);

    let response = client
        .put(format!("/api/1/leave/{}/status", engineer_leave["id"]))
        .header(bearer(&acme.engineer))
        .json(&json!({ "status": "approved" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
}

#[tokio::test]
async fn test_invalid_leave_status() {
    let client = client().await;
    time_test!("test_invalid_leave_status");
    let acme = acme(&client).await;

    let (_, leave) = apply(&client, &acme.engineer, "2025-04-01", "2025-04-01").await;
    let response = client
        .put(format!("/api/1/leave/{}/status", leave["id"]))
        .header(bearer(&acme.hr))
        .json(&json!({ "status": "maybe" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}
