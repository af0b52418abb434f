//! Task assignment endpoints.

use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Route, State};

use crate::api::{MessageResponse, StatusRequest};
use crate::auth_guards::{AuthenticatedUser, ManagerUser};
use crate::broadcaster::{Broadcaster, Topic};
use crate::clock::ClockHandle;
use crate::error::{ApiError, ApiResult};
use crate::logged_json::LoggedJson;
use crate::models::{Task, TaskFields, TaskStatus, TaskView};
use crate::orm::DbConn;
use crate::orm::task::{create_task, delete_task, list_visible, set_status, update_task};

#[get("/1/tasks")]
pub async fn list(db: DbConn, auth: AuthenticatedUser) -> ApiResult<Json<Vec<TaskView>>> {
    let company_id = auth.company_id();
    Ok(Json(
        db.run(move |conn| list_visible(conn, &auth.principal, company_id))
            .await?,
    ))
}

/// Department managers can only assign within their own department.
#[post("/1/tasks", data = "<fields>")]
pub async fn create(
    db: DbConn,
    auth: ManagerUser,
    clock: &State<ClockHandle>,
    bus: &State<Broadcaster>,
    fields: LoggedJson<TaskFields>,
) -> ApiResult<status::Created<Json<TaskView>>> {
    let fields = fields.into_inner();
    let now = clock.now_utc();
    let task = db
        .run(move |conn| create_task(conn, &auth.user, &auth.principal, fields, now))
        .await?;
    bus.publish(Topic::TaskUpdated);
    Ok(status::Created::new(format!("/api/1/tasks/{}", task.task.id)).body(Json(task)))
}

#[put("/1/tasks/<id>", data = "<fields>")]
pub async fn update(
    db: DbConn,
    auth: ManagerUser,
    bus: &State<Broadcaster>,
    id: i32,
    fields: LoggedJson<TaskFields>,
) -> ApiResult<Json<TaskView>> {
    let fields = fields.into_inner();
    let company_id = auth.company_id();
    let task = db
        .run(move |conn| update_task(conn, &auth.principal, company_id, id, fields))
        .await?;
    bus.publish(Topic::TaskUpdated);
    Ok(Json(task))
}

#[delete("/1/tasks/<id>")]
pub async fn remove(
    db: DbConn,
    auth: ManagerUser,
    clock: &State<ClockHandle>,
    bus: &State<Broadcaster>,
    id: i32,
) -> ApiResult<Json<MessageResponse>> {
    let company_id = auth.company_id();
    let now = clock.now_utc();
    db.run(move |conn| delete_task(conn, &auth.principal, company_id, id, now))
        .await?;
    bus.publish(Topic::TaskUpdated);
    Ok(Json(MessageResponse::new("Task deleted successfully.")))
}

/// Only the assignee can move a task through `todo`, `in_progress` and
/// `completed`.
#[patch("/1/tasks/<id>/status", data = "<request>")]
pub async fn update_status(
    db: DbConn,
    auth: AuthenticatedUser,
    clock: &State<ClockHandle>,
    bus: &State<Broadcaster>,
    id: i32,
    request: LoggedJson<StatusRequest>,
) -> ApiResult<Json<Task>> {
    let status = TaskStatus::parse(&request.status).ok_or_else(|| {
        ApiError::validation("Status must be 'todo', 'in_progress' or 'completed'.")
    })?;
    let now = clock.now_utc();
    let task = db
        .run(move |conn| set_status(conn, &auth.user, &auth.principal, id, status, now))
        .await?;
    bus.publish(Topic::TaskUpdated);
    Ok(Json(task))
}

pub fn routes() -> Vec<Route> {
    routes![list, create, update, remove, update_status]
}
