#[macro_use]
extern crate time_test;

mod common;

use chrono::{NaiveDate, NaiveDateTime};
use rocket::http::Status;
use rocket::tokio;
use serde_json::{Value, json};

use common::{add_employee, bearer, client_with_clock, login, register};

/// 2025-03-10 at the given UTC time. Kolkata is UTC+05:30.
fn utc(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 10)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

async fn mark(client: &rocket::local::asynchronous::Client, token: &str) -> (Status, Value) {
    let response = client
        .post("/api/1/attendance/mark")
        .header(bearer(token))
        .json(&json!({}))
        .dispatch()
        .await;
    let status = response.status();
    (status, response.into_json().await.unwrap())
}

#[tokio::test]
async fn test_grace_period_boundary() {
    let (client, clock) = client_with_clock().await;
    time_test!("test_grace_period_boundary");

    let code = register(&client, "Acme Inc", "ada@acme.test").await;
    let admin = login(&client, &code, "ada@acme.test").await;
    add_employee(&client, &admin, "eli@acme.test", "Employee", None).await;
    add_employee(&client, &admin, "sam@acme.test", "Employee", None).await;
    let eli = login(&client, &code, "eli@acme.test").await;
    let sam = login(&client, &code, "sam@acme.test").await;

    // 09:44:59 local, one second inside the 15 minute grace after 09:30.
    clock.set(utc(4, 14, 59));
    let (status, body) = mark(&client, &eli).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["message"], "Clocked in successfully as present.");
    assert_eq!(body["record"]["status"], "present");
    assert_eq!(body["record"]["date"], "2025-03-10");

    // 09:45:01 local.
    clock.set(utc(4, 15, 1));
    let (status, body) = mark(&client, &sam).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["record"]["status"], "late");
}

#[tokio::test]
async fn test_clock_in_out_then_refuse() {
    let (client, clock) = client_with_clock().await;
    time_test!("test_clock_in_out_then_refuse");

    let code = register(&client, "Acme Inc", "ada@acme.test").await;
    let admin = login(&client, &code, "ada@acme.test").await;

    clock.set(utc(3, 50, 0));
    let (status, _) = mark(&client, &admin).await;
    assert_eq!(status, Status::Ok);

    clock.set(utc(12, 30, 0));
    let (status, body) = mark(&client, &admin).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["message"], "Clocked out successfully.");
    assert!(body["record"]["clock_out"].is_string());

    clock.set(utc(12, 45, 0));
    let (status, body) = mark(&client, &admin).await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["error"], "You have already clocked out for today.");

    let response = client
        .get("/api/1/attendance/my-records")
        .header(bearer(&admin))
        .dispatch()
        .await;
    let records: Value = response.into_json().await.unwrap();
    assert_eq!(records.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_no_attendance_on_holiday() {
    let (client, clock) = client_with_clock().await;
    time_test!("test_no_attendance_on_holiday");

    let code = register(&client, "Acme Inc", "ada@acme.test").await;
    let admin = login(&client, &code, "ada@acme.test").await;
    let response = client
        .post("/api/1/settings/holidays")
        .header(bearer(&admin))
        .json(&json!({ "holiday_date": "2025-03-10", "description": "Founders Day" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    clock.set(utc(4, 0, 0));
    let (status, body) = mark(&client, &admin).await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["error"], "Cannot mark attendance. Today is a holiday.");
}

#[tokio::test]
async fn test_no_attendance_on_approved_leave() {
    let (client, clock) = client_with_clock().await;
    time_test!("test_no_attendance_on_approved_leave");

    let code = register(&client, "Acme Inc", "ada@acme.test").await;
    let admin = login(&client, &code, "ada@acme.test").await;
    add_employee(&client, &admin, "eli@acme.test", "Employee", None).await;
    let eli = login(&client, &code, "eli@acme.test").await;

    let response = client
        .post("/api/1/leave")
        .header(bearer(&eli))
        .json(&json!({
            "leave_type": "Sick",
            "start_date": "2025-03-10",
            "end_date": "2025-03-11",
            "reason": "flu"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let leave: Value = response.into_json().await.unwrap();

    let response = client
        .put(format!("/api/1/leave/{}/status", leave["id"]))
        .header(bearer(&admin))
        .json(&json!({ "status": "approved" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    clock.set(utc(4, 0, 0));
    let (status, body) = mark(&client, &eli).await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["error"], "Cannot mark attendance. You are on an approved leave.");
}

#[tokio::test]
async fn test_tenant_timezone_decides_the_day() {
    let (client, clock) = client_with_clock().await;
    time_test!("test_tenant_timezone_decides_the_day");

    let code = register(&client, "Acme Inc", "ada@acme.test").await;
    let admin = login(&client, &code, "ada@acme.test").await;
    let response = client
        .post("/api/1/settings/timezone")
        .header(bearer(&admin))
        .json(&json!({ "timezone": "America/New_York" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let response = client
        .post("/api/1/settings/timezone")
        .header(bearer(&admin))
        .json(&json!({ "timezone": "Mars/Olympus_Mons" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);

    // 03:00 UTC is still 2025-03-09 in New York (EDT, UTC-4).
    clock.set(utc(3, 0, 0));
    let (status, body) = mark(&client, &admin).await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["record"]["date"], "2025-03-09");
    assert_eq!(body["record"]["status"], "late");
}

#[tokio::test]
async fn test_attendance_listing_needs_manager() {
    let (client, _clock) = client_with_clock().await;
    time_test!("test_attendance_listing_needs_manager");

    let code = register(&client, "Acme Inc", "ada@acme.test").await;
    let admin = login(&client, &code, "ada@acme.test").await;
    add_employee(&client, &admin, "eli@acme.test", "Employee", None).await;
    let eli = login(&client, &code, "eli@acme.test").await;

    let response = client
        .get("/api/1/attendance")
        .header(bearer(&eli))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    mark(&client, &eli).await;
    let response = client
        .get("/api/1/attendance")
        .header(bearer(&admin))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let rows: Value = response.into_json().await.unwrap();
    assert_eq!(rows[0]["user_name"], "Test eli");
}
