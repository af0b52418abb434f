//! Per-tenant settings: designations, holidays, office timings and the
//! timezone used for attendance and dashboards.

use chrono::NaiveDate;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::api::MessageResponse;
use crate::auth_guards::{AuthenticatedUser, HrUser};
use crate::broadcaster::{Broadcaster, Topic};
use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::identity::Role;
use crate::logged_json::LoggedJson;
use crate::models::{Designation, Holiday};
use crate::orm::DbConn;
use crate::orm::settings::{
    OfficeTimings, add_designation, add_holiday, company_timezone, delete_designation,
    delete_holiday, list_designations, list_holidays, office_timings, save_office_timings,
    save_timezone,
};

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DesignationRequest {
    pub title: String,
    pub maps_to_role: String,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HolidayRequest {
    #[ts(type = "string")]
    pub holiday_date: NaiveDate,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OfficeTimingsRequest {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TimezoneSetting {
    pub timezone: String,
}

// Designations

#[get("/1/settings/designations")]
pub async fn designations(db: DbConn, auth: HrUser) -> ApiResult<Json<Vec<Designation>>> {
    let company_id = auth.company_id();
    Ok(Json(db.run(move |conn| list_designations(conn, company_id)).await?))
}

#[post("/1/settings/designations", data = "<request>")]
pub async fn create_designation(
    db: DbConn,
    auth: HrUser,
    bus: &State<Broadcaster>,
    request: LoggedJson<DesignationRequest>,
) -> ApiResult<status::Created<Json<Designation>>> {
    let DesignationRequest { title, maps_to_role } = request.into_inner();
    let role: Role = maps_to_role
        .trim()
        .parse()
        .map_err(|e| ApiError::validation(format!("Invalid role: {e}.")))?;
    let company_id = auth.company_id();
    let designation = db
        .run(move |conn| add_designation(conn, company_id, &title, role))
        .await?;
    bus.publish(Topic::SettingsUpdated);
    Ok(status::Created::new(format!("/api/1/settings/designations/{}", designation.id))
        .body(Json(designation)))
}

#[delete("/1/settings/designations/<id>")]
pub async fn remove_designation(
    db: DbConn,
    auth: HrUser,
    bus: &State<Broadcaster>,
    id: i32,
) -> ApiResult<Json<MessageResponse>> {
    let company_id = auth.company_id();
    db.run(move |conn| delete_designation(conn, company_id, id)).await?;
    bus.publish(Topic::SettingsUpdated);
    Ok(Json(MessageResponse::new("Designation deleted successfully.")))
}

// Holidays

/// Holidays ordered by date. Readable by every principal of the tenant.
#[get("/1/settings/holidays")]
pub async fn holidays(db: DbConn, auth: AuthenticatedUser) -> ApiResult<Json<Vec<Holiday>>> {
    let company_id = auth.company_id();
    Ok(Json(db.run(move |conn| list_holidays(conn, company_id)).await?))
}

#[post("/1/settings/holidays", data = "<request>")]
pub async fn create_holiday(
    db: DbConn,
    auth: HrUser,
    bus: &State<Broadcaster>,
    request: LoggedJson<HolidayRequest>,
) -> ApiResult<status::Created<Json<Holiday>>> {
    let HolidayRequest {
        holiday_date,
        description,
    } = request.into_inner();
    let company_id = auth.company_id();
    let holiday = db
        .run(move |conn| add_holiday(conn, company_id, holiday_date, &description))
        .await?;
    bus.publish(Topic::SettingsUpdated);
    Ok(status::Created::new(format!("/api/1/settings/holidays/{}", holiday.id)).body(Json(holiday)))
}

#[delete("/1/settings/holidays/<id>")]
pub async fn remove_holiday(
    db: DbConn,
    auth: HrUser,
    bus: &State<Broadcaster>,
    id: i32,
) -> ApiResult<Json<MessageResponse>> {
    let company_id = auth.company_id();
    db.run(move |conn| delete_holiday(conn, company_id, id)).await?;
    bus.publish(Topic::SettingsUpdated);
    Ok(Json(MessageResponse::new("Holiday deleted successfully.")))
}

// Office timings

#[get("/1/settings/office-timings")]
pub async fn get_office_timings(db: DbConn, auth: AuthenticatedUser) -> ApiResult<Json<OfficeTimings>> {
    let company_id = auth.company_id();
    Ok(Json(db.run(move |conn| office_timings(conn, company_id)).await?))
}

#[post("/1/settings/office-timings", data = "<request>")]
pub async fn set_office_timings(
    db: DbConn,
    auth: HrUser,
    bus: &State<Broadcaster>,
    request: LoggedJson<OfficeTimingsRequest>,
) -> ApiResult<Json<OfficeTimings>> {
    let OfficeTimingsRequest {
        start_time,
        end_time,
    } = request.into_inner();
    let company_id = auth.company_id();
    let saved = db
        .run(move |conn| {
            save_office_timings(conn, company_id, start_time.as_deref(), end_time.as_deref())
        })
        .await?;
    bus.publish(Topic::SettingsUpdated);
    Ok(Json(saved))
}

// Timezone

/// The effective zone: the stored one if it parses, else the fallback.
#[get("/1/settings/timezone")]
pub async fn get_timezone(
    db: DbConn,
    auth: AuthenticatedUser,
    config: &State<AppConfig>,
) -> ApiResult<Json<TimezoneSetting>> {
    let company_id = auth.company_id();
    let fallback = config.fallback_timezone();
    let tz = db
        .run(move |conn| company_timezone(conn, company_id, fallback))
        .await?;
    Ok(Json(TimezoneSetting {
        timezone: tz.name().to_string(),
    }))
}

#[post("/1/settings/timezone", data = "<request>")]
pub async fn set_timezone(
    db: DbConn,
    auth: HrUser,
    bus: &State<Broadcaster>,
    request: LoggedJson<TimezoneSetting>,
) -> ApiResult<Json<TimezoneSetting>> {
    let requested = request.into_inner().timezone;
    let company_id = auth.company_id();
    let tz = db
        .run(move |conn| save_timezone(conn, company_id, &requested))
        .await?;
    info!("Company {} timezone set to {}", company_id, tz.name());
    bus.publish(Topic::SettingsUpdated);
    Ok(Json(TimezoneSetting {
        timezone: tz.name().to_string(),
    }))
}

pub fn routes() -> Vec<Route> {
    routes![
        designations,
        create_designation,
        remove_designation,
        holidays,
        create_holiday,
        remove_holiday,
        get_office_timings,
        set_office_timings,
        get_timezone,
        set_timezone
    ]
}
