#[macro_use]
extern crate time_test;

mod common;

use rocket::http::{Header, Status};
use rocket::tokio;
use serde_json::{Value, json};

use common::{PASSWORD, bearer, client, login, register};

#[tokio::test]
async fn test_register_then_login() {
    let client = client().await;
    time_test!("test_register_then_login");

    let code = register(&client, "Acme Inc", "ada@acme.test").await;
    assert_eq!(code, "acme-inc");

    let response = client
        .post("/api/1/auth/login")
        .json(&json!({
            "company_code": "acme-inc",
            "email": "ADA@acme.test",
            "password": PASSWORD
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["message"], "Login successful!");
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["company_name"], "Acme Inc");
    assert!(body["token"].as_str().unwrap().len() > 20);
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let client = client().await;
    time_test!("test_register_rejects_weak_password");

    let response = client
        .post("/api/1/auth/register")
        .json(&json!({
            "company_name": "Acme Inc",
            "first_name": "Ada",
            "last_name": "Admin",
            "email": "ada@acme.test",
            "password": "password"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[tokio::test]
async fn test_register_same_company_twice() {
    let client = client().await;
    time_test!("test_register_same_company_twice");

    register(&client, "Acme Inc", "ada@acme.test").await;
    let response = client
        .post("/api/1/auth/register")
        .json(&json!({
            "company_name": "acme inc",
            "first_name": "Other",
            "last_name": "Admin",
            "email": "other@acme.test",
            "password": PASSWORD
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[tokio::test]
async fn test_login_failures_are_unauthorized() {
    let client = client().await;
    time_test!("test_login_failures_are_unauthorized");

    register(&client, "Acme Inc", "ada@acme.test").await;
    for (code, email, password) in [
        ("acme-inc", "ada@acme.test", "Wr0ng!pass"),
        ("acme-inc", "nobody@acme.test", PASSWORD),
        ("no-such-company", "ada@acme.test", PASSWORD),
    ] {
        let response = client
            .post("/api/1/auth/login")
            .json(&json!({ "company_code": code, "email": email, "password": password }))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized, "{code}/{email}");
    }
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let client = client().await;
    time_test!("test_missing_or_bad_token_is_unauthorized");

    let response = client.get("/api/1/employees").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);

    let response = client
        .get("/api/1/employees")
        .header(Header::new("Authorization", "Bearer not-a-token"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn test_query_token_only_accepted_for_events() {
    let client = client().await;
    time_test!("test_query_token_only_accepted_for_events");

    let code = register(&client, "Acme Inc", "ada@acme.test").await;
    let token = login(&client, &code, "ada@acme.test").await;

    let response = client
        .get(format!("/api/1/company/details?access_token={token}"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);

    let response = client
        .get("/api/1/company/details")
        .header(bearer(&token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["name"], "Acme Inc");
    assert_eq!(body["company_code"], "acme-inc");
}

#[tokio::test]
async fn test_status_needs_no_token() {
    let client = client().await;
    time_test!("test_status_needs_no_token");

    let response = client.get("/api/1/status").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["status"], "running");
    assert_eq!(body["database"], "ok");
    assert!(body["version"].is_string());
}
