//! Employee directory and lifecycle endpoints.

use chrono::NaiveDate;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::api::MessageResponse;
use crate::auth_guards::{AuthenticatedUser, HrUser, ManagerUser};
use crate::broadcaster::{Broadcaster, Topic};
use crate::clock::ClockHandle;
use crate::error::{ApiError, ApiResult};
use crate::identity::{EmploymentStatus, Role};
use crate::logged_json::LoggedJson;
use crate::models::{EmployeeProfile, EmployeeSummary, ProfileChanges, User};
use crate::orm::DbConn;
use crate::orm::login::{check_password_strength, hash_password};
use crate::orm::user::{
    BulkImportResult, ImportRow, add_employee, bulk_import, change_role, delete_employee,
    list_employees, set_employment_status, update_employee, update_profile,
};

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewEmployeeRequest {
    #[serde(flatten)]
    pub profile: EmployeeProfile,
    pub password: String,
}

/// One row of a bulk import. A missing password gets a generated one.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BulkEmployeeRow {
    #[serde(flatten)]
    pub profile: EmployeeProfile,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EmploymentStatusRequest {
    pub status: String,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub last_working_day: Option<NaiveDate>,
    #[serde(default)]
    pub exit_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoleChangeRequest {
    pub role: String,
}

fn check_names(first_name: &str, last_name: &str) -> ApiResult<()> {
    if first_name.trim().is_empty() || last_name.trim().is_empty() {
        return Err(ApiError::validation("First and last name are required."));
    }
    Ok(())
}

/// List Employees endpoint.
///
/// - **URL:** `/api/1/employees`
/// - **Method:** `GET`
/// - **Authentication:** admin, hr_manager or department_manager
///
/// Admins are never listed. Department managers see their own team only.
#[get("/1/employees")]
pub async fn list(db: DbConn, auth: ManagerUser) -> ApiResult<Json<Vec<EmployeeSummary>>> {
    let company_id = auth.company_id();
    let employees = db
        .run(move |conn| list_employees(conn, &auth.principal, company_id))
        .await?;
    Ok(Json(employees))
}

/// Add Employee endpoint.
///
/// - **URL:** `/api/1/employees`
/// - **Method:** `POST`
/// - **Authentication:** admin or hr_manager
///
/// The role comes from the designation title; unknown titles give
/// `employee`.
#[post("/1/employees", data = "<request>")]
pub async fn create(
    db: DbConn,
    auth: HrUser,
    clock: &State<ClockHandle>,
    bus: &State<Broadcaster>,
    request: LoggedJson<NewEmployeeRequest>,
) -> ApiResult<status::Created<Json<User>>> {
    let NewEmployeeRequest { profile, password } = request.into_inner();
    check_names(&profile.first_name, &profile.last_name)?;
    if profile.email.trim().is_empty() {
        return Err(ApiError::validation("Email is required."));
    }
    check_password_strength(&password)?;
    let password_hash = hash_password(&password)?;

    let company_id = auth.company_id();
    let now = clock.now_utc();
    let user = db
        .run(move |conn| add_employee(conn, company_id, profile, password_hash, now))
        .await?;
    info!("Employee {} added to company {} by {}", user.id, company_id, auth.user.email);
    bus.publish(Topic::EmployeeUpdated);
    Ok(status::Created::new(format!("/api/1/employees/{}", user.id)).body(Json(user)))
}

#[post("/1/employees/bulk", data = "<rows>")]
pub async fn import(
    db: DbConn,
    auth: HrUser,
    clock: &State<ClockHandle>,
    bus: &State<Broadcaster>,
    rows: LoggedJson<Vec<BulkEmployeeRow>>,
) -> ApiResult<Json<BulkImportResult>> {
    let rows: Vec<ImportRow> = rows
        .into_inner()
        .into_iter()
        .map(|row| ImportRow {
            profile: row.profile,
            password: row.password,
        })
        .collect();
    let company_id = auth.company_id();
    let now = clock.now_utc();
    let result = db
        .run(move |conn| bulk_import(conn, company_id, rows, now))
        .await?;
    info!(
        "Bulk import into company {}: {} imported, {} skipped",
        company_id, result.imported, result.skipped
    );
    if result.imported > 0 {
        bus.publish(Topic::EmployeeUpdated);
    }
    Ok(Json(result))
}

#[put("/1/employees/<id>", data = "<profile>")]
pub async fn update(
    db: DbConn,
    auth: HrUser,
    bus: &State<Broadcaster>,
    id: i32,
    profile: LoggedJson<EmployeeProfile>,
) -> ApiResult<Json<MessageResponse>> {
    let profile = profile.into_inner();
    check_names(&profile.first_name, &profile.last_name)?;
    let company_id = auth.company_id();
    db.run(move |conn| update_employee(conn, company_id, id, profile))
        .await?;
    bus.publish(Topic::EmployeeUpdated);
    Ok(Json(MessageResponse::new("Employee updated successfully.")))
}

/// The caller's own record as reloaded by the guard.
#[get("/1/employees/my-profile")]
pub fn my_profile(auth: AuthenticatedUser) -> Json<User> {
    Json(auth.user)
}

#[put("/1/employees/my-profile", data = "<changes>")]
pub async fn update_my_profile(
    db: DbConn,
    auth: AuthenticatedUser,
    bus: &State<Broadcaster>,
    changes: LoggedJson<ProfileChanges>,
) -> ApiResult<Json<User>> {
    let changes = changes.into_inner();
    check_names(&changes.first_name, &changes.last_name)?;
    let (company_id, user_id) = (auth.company_id(), auth.user.id);
    let user = db
        .run(move |conn| update_profile(conn, company_id, user_id, &changes))
        .await?;
    bus.publish(Topic::EmployeeUpdated);
    Ok(Json(user))
}

#[patch("/1/employees/<id>/status", data = "<request>")]
pub async fn set_status(
    db: DbConn,
    auth: HrUser,
    bus: &State<Broadcaster>,
    id: i32,
    request: LoggedJson<EmploymentStatusRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let request = request.into_inner();
    let status = EmploymentStatus::parse(request.status.trim())
        .ok_or_else(|| ApiError::validation("Status must be 'active' or 'inactive'."))?;
    let company_id = auth.company_id();
    db.run(move |conn| {
        set_employment_status(
            conn,
            company_id,
            id,
            status,
            request.last_working_day,
            request.exit_reason,
        )
    })
    .await?;
    bus.publish(Topic::EmployeeUpdated);
    Ok(Json(MessageResponse::new("Employee status updated.")))
}

/// Permanent removal. Only inactive, non-admin employees can be deleted.
#[delete("/1/employees/<id>")]
pub async fn remove(
    db: DbConn,
    auth: HrUser,
    bus: &State<Broadcaster>,
    id: i32,
) -> ApiResult<Json<MessageResponse>> {
    let actor = auth.principal.clone();
    db.run(move |conn| delete_employee(conn, &actor, id)).await?;
    info!("Employee {} deleted by {}", id, auth.user.email);
    bus.publish(Topic::EmployeeUpdated);
    Ok(Json(MessageResponse::new("Employee permanently deleted.")))
}

#[put("/1/employees/<id>/role", data = "<request>")]
pub async fn set_role(
    db: DbConn,
    auth: HrUser,
    bus: &State<Broadcaster>,
    id: i32,
    request: LoggedJson<RoleChangeRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let role: Role = request
        .role
        .trim()
        .parse()
        .map_err(|e| ApiError::validation(format!("Invalid role: {e}.")))?;
    let actor = auth.principal.clone();
    db.run(move |conn| change_role(conn, &actor, id, role)).await?;
    info!("Role of employee {} set to {} by {}", id, role, auth.user.email);
    bus.publish(Topic::EmployeeUpdated);
    Ok(Json(MessageResponse::new("Employee role updated successfully.")))
}

pub fn routes() -> Vec<Route> {
    routes![
        list,
        create,
        import,
        update,
        my_profile,
        update_my_profile,
        set_status,
        remove,
        set_role
    ]
}
