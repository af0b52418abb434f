use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Route, State};

use crate::api::MessageResponse;
use crate::auth_guards::{AuthenticatedUser, HrUser};
use crate::broadcaster::{Broadcaster, Topic};
use crate::error::ApiResult;
use crate::logged_json::LoggedJson;
use crate::models::{Department, DepartmentFields, DepartmentView};
use crate::orm::DbConn;
use crate::orm::department::{
    create_department, delete_department, list_departments, update_department,
};

/// Every department of the tenant with its manager and head count.
#[get("/1/departments")]
pub async fn list(db: DbConn, auth: AuthenticatedUser) -> ApiResult<Json<Vec<DepartmentView>>> {
    let company_id = auth.company_id();
    Ok(Json(db.run(move |conn| list_departments(conn, company_id)).await?))
}

#[post("/1/departments", data = "<fields>")]
pub async fn create(
    db: DbConn,
    auth: HrUser,
    bus: &State<Broadcaster>,
    fields: LoggedJson<DepartmentFields>,
) -> ApiResult<status::Created<Json<Department>>> {
    let company_id = auth.company_id();
    let fields = fields.into_inner();
    let department = db
        .run(move |conn| create_department(conn, company_id, fields))
        .await?;
    bus.publish(Topic::DepartmentUpdated);
    Ok(status::Created::new(format!("/api/1/departments/{}", department.id)).body(Json(department)))
}

#[put("/1/departments/<id>", data = "<fields>")]
pub async fn update(
    db: DbConn,
    auth: HrUser,
    bus: &State<Broadcaster>,
    id: i32,
    fields: LoggedJson<DepartmentFields>,
) -> ApiResult<Json<Department>> {
    let company_id = auth.company_id();
    let fields = fields.into_inner();
    let department = db
        .run(move |conn| update_department(conn, company_id, id, fields))
        .await?;
    bus.publish(Topic::DepartmentUpdated);
    Ok(Json(department))
}

/// Members of the department are kept, with no department.
#[delete("/1/departments/<id>")]
pub async fn remove(
    db: DbConn,
    auth: HrUser,
    bus: &State<Broadcaster>,
    id: i32,
) -> ApiResult<Json<MessageResponse>> {
    let company_id = auth.company_id();
    db.run(move |conn| delete_department(conn, company_id, id)).await?;
    bus.publish(Topic::DepartmentUpdated);
    Ok(Json(MessageResponse::new("Department deleted successfully.")))
}

pub fn routes() -> Vec<Route> {
    routes![list, create, update, remove]
}
