use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Route, State};

use crate::api::StatusRequest;
use crate::auth_guards::{AuthenticatedUser, ManagerUser};
use crate::broadcaster::{Broadcaster, Topic};
use crate::clock::ClockHandle;
use crate::error::{ApiError, ApiResult};
use crate::logged_json::LoggedJson;
use crate::models::{LeaveRequest, LeaveStatus};
use crate::orm::DbConn;
use crate::orm::leave::{LeaveApplication, apply, list_visible, set_status};

/// Leave requests visible to the caller: their own, their department's
/// or the whole company's depending on role.
#[get("/1/leave")]
pub async fn list(db: DbConn, auth: AuthenticatedUser) -> ApiResult<Json<Vec<LeaveRequest>>> {
    let company_id = auth.company_id();
    Ok(Json(
        db.run(move |conn| list_visible(conn, &auth.principal, company_id))
            .await?,
    ))
}

/// Apply for Leave endpoint.
///
/// - **URL:** `/api/1/leave`
/// - **Method:** `POST`
/// - **Authentication:** any tenant user
///
/// Dates are inclusive. A range overlapping one of the caller's pending or
/// approved requests is refused.
#[post("/1/leave", data = "<application>")]
pub async fn create(
    db: DbConn,
    auth: AuthenticatedUser,
    clock: &State<ClockHandle>,
    bus: &State<Broadcaster>,
    application: LoggedJson<LeaveApplication>,
) -> ApiResult<status::Created<Json<LeaveRequest>>> {
    let application = application.into_inner();
    let now = clock.now_utc();
    let request = db
        .run(move |conn| apply(conn, &auth.user, application, now))
        .await?;
    info!(
        "Leave request {} filed by user {} ({} to {})",
        request.id, request.requestor_id, request.start_date, request.end_date
    );
    bus.publish(Topic::LeaveRequestUpdated);
    Ok(status::Created::new(format!("/api/1/leave/{}", request.id)).body(Json(request)))
}

#[put("/1/leave/<id>/status", data = "<request>")]
pub async fn update_status(
    db: DbConn,
    auth: ManagerUser,
    clock: &State<ClockHandle>,
    bus: &State<Broadcaster>,
    id: i32,
    request: LoggedJson<StatusRequest>,
) -> ApiResult<Json<LeaveRequest>> {
    let status = LeaveStatus::parse(&request.status).ok_or_else(|| {
        ApiError::validation("Status must be 'pending', 'approved' or 'rejected'.")
    })?;
    let now = clock.now_utc();
    let updated = db
        .run(move |conn| set_status(conn, &auth.user, &auth.principal, id, status, now))
        .await?;
    info!("Leave request {} set to {}", updated.id, updated.status);
    bus.publish(Topic::LeaveRequestUpdated);
    Ok(Json(updated))
}

pub fn routes() -> Vec<Route> {
    routes![list, create, update_status]
}
