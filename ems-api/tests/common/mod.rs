//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use rocket::http::{Header, Status};
use rocket::local::asynchronous::Client;
use serde_json::{Value, json};

use ems_api::clock::FixedClock;
use ems_api::orm::testing::{fixed_now, test_rocket, test_rocket_with_clock};

pub const PASSWORD: &str = "Str0ng!pw";

pub async fn client() -> Client {
    Client::tracked(test_rocket()).await.unwrap()
}

/// A client whose clock the test can move between requests.
pub async fn client_with_clock() -> (Client, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(fixed_now()));
    let client = Client::tracked(test_rocket_with_clock(clock.clone()))
        .await
        .unwrap();
    (client, clock)
}

pub fn bearer(token: &str) -> Header<'static> {
    Header::new("Authorization", format!("Bearer {token}"))
}

/// Registers a company and returns its login code.
pub async fn register(client: &Client, company_name: &str, admin_email: &str) -> String {
    let response = client
        .post("/api/1/auth/register")
        .json(&json!({
            "company_name": company_name,
            "first_name": "Ada",
            "last_name": "Admin",
            "email": admin_email,
            "password": PASSWORD
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let body: Value = response.into_json().await.unwrap();
    body["company_code"].as_str().unwrap().to_string()
}

pub async fn login(client: &Client, company_code: &str, email: &str) -> String {
    let response = client
        .post("/api/1/auth/login")
        .json(&json!({
            "company_code": company_code,
            "email": email,
            "password": PASSWORD
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok, "login of {email} failed");
    let body: Value = response.into_json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

pub async fn create_department(client: &Client, token: &str, name: &str) -> i64 {
    let response = client
        .post("/api/1/departments")
        .header(bearer(token))
        .json(&json!({ "name": name }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let body: Value = response.into_json().await.unwrap();
    body["id"].as_i64().unwrap()
}

/// Adds an employee with the standard test password and returns the id.
pub async fn add_employee(
    client: &Client,
    token: &str,
    email: &str,
    designation: &str,
    department_id: Option<i64>,
) -> i64 {
    let response = client
        .post("/api/1/employees")
        .header(bearer(token))
        .json(&json!({
            "first_name": "Test",
            "last_name": email.split('@').next().unwrap(),
            "email": email,
            "designation": designation,
            "department_id": department_id,
            "password": PASSWORD
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created, "adding {email} failed");
    let body: Value = response.into_json().await.unwrap();
    body["id"].as_i64().unwrap()
}

/// Acme with HR, two departments, a manager of "Engineering" and one
/// employee in each department. Every token is ready to use.
pub struct Acme {
    pub code: String,
    pub admin: String,
    pub hr: String,
    pub manager: String,
    pub manager_id: i64,
    pub engineer: String,
    pub engineer_id: i64,
    pub seller: String,
    pub seller_id: i64,
    pub engineering_id: i64,
    pub sales_id: i64,
}

pub async fn acme(client: &Client) -> Acme {
    let code = register(client, "Acme Inc", "ada@acme.test").await;
    let admin = login(client, &code, "ada@acme.test").await;
    let engineering_id = create_department(client, &admin, "Engineering").await;
    let sales_id = create_department(client, &admin, "Sales").await;

    add_employee(client, &admin, "hana@acme.test", "HR Manager", None).await;
    let manager_id = add_employee(
        client,
        &admin,
        "mona@acme.test",
        "Department Manager",
        Some(engineering_id),
    )
    .await;
    let engineer_id =
        add_employee(client, &admin, "eli@acme.test", "Employee", Some(engineering_id)).await;
    let seller_id = add_employee(client, &admin, "sam@acme.test", "Employee", Some(sales_id)).await;

    Acme {
        hr: login(client, &code, "hana@acme.test").await,
        manager: login(client, &code, "mona@acme.test").await,
        engineer: login(client, &code, "eli@acme.test").await,
        seller: login(client, &code, "sam@acme.test").await,
        code,
        admin,
        manager_id,
        engineer_id,
        seller_id,
        engineering_id,
        sales_id,
    }
}
