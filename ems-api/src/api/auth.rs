//! Company sign-up and login.
//!
//! Neither endpoint takes a token. Login returns the bearer token every other
//! endpoint expects in the `Authorization` header.

use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::clock::ClockHandle;
use crate::error::{ApiError, ApiResult};
use crate::identity::{Principal, Role};
use crate::logged_json::LoggedJson;
use crate::orm::DbConn;
use crate::orm::company::{Registration, register_company};
use crate::orm::login::{
    authenticate_super_admin, authenticate_user, check_password_strength, hash_password,
    is_super_admin_code,
};
use crate::token::TokenService;

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegisterRequest {
    pub company_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct RegisterResponse {
    pub message: String,
    pub company_code: String,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginRequest {
    pub company_code: String,
    pub email: String,
    pub password: String,
}

/// The user block of a login response.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct LoginUser {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub company_id: Option<i32>,
    pub company_name: Option<String>,
    pub department_id: Option<i32>,
    pub designation: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: LoginUser,
}

fn require_fields(fields: &[(&str, &str)]) -> ApiResult<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(format!("Missing required fields: {}.", missing.join(", "))))
    }
}

fn issue_token(tokens: &TokenService, principal: &Principal) -> ApiResult<String> {
    tokens
        .issue(principal)
        .map_err(|e| ApiError::internal(e.to_string()))
}

/// Register Company endpoint.
///
/// - **URL:** `/api/1/auth/register`
/// - **Method:** `POST`
/// - **Authentication:** None
///
/// Creates the company, its admin user and the default designations in
/// one transaction. The company code is derived from the name.
///
/// ```json
/// {
///   "company_name": "Acme Inc",
///   "first_name": "Ada",
///   "last_name": "Admin",
///   "email": "ada@acme.test",
///   "password": "Str0ng!pw"
/// }
/// ```
#[post("/1/auth/register", data = "<request>")]
pub async fn register(
    db: DbConn,
    clock: &State<ClockHandle>,
    request: LoggedJson<RegisterRequest>,
) -> ApiResult<status::Created<Json<RegisterResponse>>> {
    let request = request.into_inner();
    require_fields(&[
        ("company_name", &request.company_name),
        ("first_name", &request.first_name),
        ("last_name", &request.last_name),
        ("email", &request.email),
    ])?;
    check_password_strength(&request.password)?;

    let password_hash = hash_password(&request.password)?;
    let now = clock.now_utc();
    let (company, admin) = db
        .run(move |conn| {
            register_company(
                conn,
                Registration {
                    company_name: request.company_name,
                    first_name: request.first_name.trim().to_string(),
                    last_name: request.last_name.trim().to_string(),
                    email: request.email,
                    password_hash,
                },
                now,
            )
        })
        .await?;
    info!(
        "Registered company '{}' ({}) with admin '{}'",
        company.name, company.company_code, admin.email
    );

    Ok(status::Created::new(format!("/api/1/company/{}", company.id)).body(Json(
        RegisterResponse {
            message: "Company and Admin user registered successfully!".to_string(),
            company_code: company.company_code,
        },
    )))
}

/// Login endpoint.
///
/// - **URL:** `/api/1/auth/login`
/// - **Method:** `POST`
/// - **Authentication:** None
///
/// The company code `superadmin` routes to the platform super admin.
/// Unknown companies, bad credentials and inactive accounts are all 401.
#[post("/1/auth/login", data = "<request>")]
pub async fn login(
    db: DbConn,
    tokens: &State<TokenService>,
    request: LoggedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let request = request.into_inner();
    require_fields(&[
        ("company_code", &request.company_code),
        ("email", &request.email),
        ("password", &request.password),
    ])?;

    if is_super_admin_code(&request.company_code) {
        let admin = authenticate_super_admin(&db, &request.email, &request.password)
            .await
            .inspect_err(|_| warn!("Failed super admin login for '{}'", request.email))?;
        let principal = Principal {
            id: admin.id,
            email: admin.email.clone(),
            role: Role::SuperAdmin,
            company_id: None,
            department_id: None,
        };
        let token = issue_token(tokens, &principal)?;
        info!("Super admin '{}' logged in", admin.email);
        return Ok(Json(LoginResponse {
            message: "Super Admin login successful!".to_string(),
            token,
            user: LoginUser {
                id: admin.id,
                first_name: "Super".to_string(),
                last_name: "Admin".to_string(),
                email: admin.email,
                role: Role::SuperAdmin,
                company_id: None,
                company_name: None,
                department_id: None,
                designation: None,
            },
        }));
    }

    let (company, user) =
        authenticate_user(&db, &request.company_code, &request.email, &request.password)
            .await
            .inspect_err(|e| {
                warn!(
                    "Failed login for '{}' in company '{}': {}",
                    request.email, request.company_code, e
                )
            })?;
    let principal = user
        .principal()
        .ok_or_else(|| ApiError::internal(format!("user {} has role '{}'", user.id, user.role)))?;
    let token = issue_token(tokens, &principal)?;
    info!("User '{}' from company '{}' logged in", user.email, company.company_code);

    Ok(Json(LoginResponse {
        message: "Login successful!".to_string(),
        token,
        user: LoginUser {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: principal.role,
            company_id: Some(company.id),
            company_name: Some(company.name),
            department_id: user.department_id,
            designation: user.designation,
        },
    }))
}

pub fn routes() -> Vec<Route> {
    routes![register, login]
}
