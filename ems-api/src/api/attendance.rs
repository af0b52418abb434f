//! Clock-in and clock-out, plus attendance listings.

use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::attendance::Transition;
use crate::auth_guards::{AuthenticatedUser, ManagerUser};
use crate::broadcaster::{Broadcaster, Topic};
use crate::clock::ClockHandle;
use crate::config::AppConfig;
use crate::error::ApiResult;
use crate::logged_json::LoggedJson;
use crate::models::{AttendanceRecord, AttendanceView};
use crate::orm::DbConn;
use crate::orm::attendance::{MarkLocation, list_visible, mark, my_records};

/// Optional free-text locations reported by the client.
#[derive(Debug, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MarkRequest {
    #[serde(default)]
    pub clock_in_location: Option<String>,
    #[serde(default)]
    pub clock_out_location: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct MarkResponse {
    pub message: String,
    pub record: AttendanceRecord,
}

/// Attendance records of everyone the caller may see.
#[get("/1/attendance")]
pub async fn list(db: DbConn, auth: ManagerUser) -> ApiResult<Json<Vec<AttendanceView>>> {
    let company_id = auth.company_id();
    Ok(Json(
        db.run(move |conn| list_visible(conn, &auth.principal, company_id))
            .await?,
    ))
}

#[get("/1/attendance/my-records")]
pub async fn mine(db: DbConn, auth: AuthenticatedUser) -> ApiResult<Json<Vec<AttendanceRecord>>> {
    let user_id = auth.user.id;
    Ok(Json(db.run(move |conn| my_records(conn, user_id)).await?))
}

/// Mark Attendance endpoint.
///
/// - **URL:** `/api/1/attendance/mark`
/// - **Method:** `POST`
/// - **Authentication:** any tenant user
///
/// The first call of the company-local day clocks in (`present` or `late`
/// against office start plus grace), the second clocks out. Further calls,
/// holidays and approved leave are refused with 400.
#[post("/1/attendance/mark", data = "<request>")]
pub async fn mark_attendance(
    db: DbConn,
    auth: AuthenticatedUser,
    clock: &State<ClockHandle>,
    config: &State<AppConfig>,
    bus: &State<Broadcaster>,
    request: Option<LoggedJson<MarkRequest>>,
) -> ApiResult<Json<MarkResponse>> {
    let request = request.map(LoggedJson::into_inner).unwrap_or_default();
    let location = MarkLocation {
        clock_in_location: request.clock_in_location,
        clock_out_location: request.clock_out_location,
    };
    let company_id = auth.company_id();
    let now = clock.now_utc();
    let fallback = config.fallback_timezone();
    let email = auth.user.email.clone();
    let (transition, record) = db
        .run(move |conn| mark(conn, &auth.principal, company_id, now, fallback, location))
        .await?;

    let message = match transition {
        Transition::ClockIn(status) => {
            info!("{} clocked in as {}", email, status.as_str());
            format!("Clocked in successfully as {}.", status.as_str())
        }
        Transition::ClockOut => {
            info!("{} clocked out", email);
            "Clocked out successfully.".to_string()
        }
    };
    bus.publish(Topic::AttendanceUpdated);
    Ok(Json(MarkResponse { message, record }))
}

pub fn routes() -> Vec<Route> {
    routes![list, mine, mark_attendance]
}
