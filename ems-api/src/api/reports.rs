//! Read-only aggregates: dashboard counters, HR reports, the org chart and
//! the company calendar.

use rocket::serde::json::Json;
use rocket::{Route, State};

use crate::auth_guards::{AuthenticatedUser, HrUser};
use crate::clock::ClockHandle;
use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::orm::DbConn;
use crate::orm::reports::{
    CalendarEvent, DashboardStats, OrgChartNode, ReportSummary, calendar_events, dashboard_stats,
    org_chart, report_summary,
};
use crate::orm::settings::company_local_now;

/// Counters shaped by the caller's role. "Today" is the company-local date.
#[get("/1/dashboard/stats")]
pub async fn dashboard(
    db: DbConn,
    auth: AuthenticatedUser,
    clock: &State<ClockHandle>,
    config: &State<AppConfig>,
) -> ApiResult<Json<DashboardStats>> {
    let company_id = auth.company_id();
    let now = clock.now_utc();
    let fallback = config.fallback_timezone();
    let stats = db
        .run(move |conn| {
            let today = company_local_now(conn, company_id, now, fallback)?.date();
            dashboard_stats(conn, &auth.principal, company_id, today)
        })
        .await?;
    Ok(Json(stats))
}

#[get("/1/reports/summary")]
pub async fn summary(
    db: DbConn,
    auth: HrUser,
    clock: &State<ClockHandle>,
    config: &State<AppConfig>,
) -> ApiResult<Json<ReportSummary>> {
    let company_id = auth.company_id();
    let now = clock.now_utc();
    let fallback = config.fallback_timezone();
    let summary = db
        .run(move |conn| {
            let today = company_local_now(conn, company_id, now, fallback)?.date();
            report_summary(conn, company_id, today)
        })
        .await?;
    Ok(Json(summary))
}

/// `null` for a company without principals, 404 when it has no admin.
#[get("/1/org-chart")]
pub async fn chart(db: DbConn, auth: AuthenticatedUser) -> ApiResult<Json<Option<OrgChartNode>>> {
    let company_id = auth.company_id();
    let chart = db.run(move |conn| org_chart(conn, company_id)).await?;
    chart
        .map(Json)
        .map_err(|_| ApiError::not_found("Organization chart has no admin."))
}

#[get("/1/calendar/events")]
pub async fn calendar(db: DbConn, auth: AuthenticatedUser) -> ApiResult<Json<Vec<CalendarEvent>>> {
    let company_id = auth.company_id();
    Ok(Json(db.run(move |conn| calendar_events(conn, company_id)).await?))
}

pub fn routes() -> Vec<Route> {
    routes![dashboard, summary, chart, calendar]
}
