//! Tenant details and the platform-wide super admin dashboard.

use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::Serialize;
use ts_rs::TS;

use crate::auth_guards::{AuthenticatedUser, SuperAdminUser};
use crate::clock::ClockHandle;
use crate::error::{ApiError, ApiResult};
use crate::orm::DbConn;
use crate::orm::company::{PlatformStats, get_company_by_id, platform_stats};

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct CompanyDetails {
    pub name: String,
    pub company_code: String,
}

/// Company Details endpoint.
///
/// - **URL:** `/api/1/company/details`
/// - **Method:** `GET`
/// - **Authentication:** Any tenant principal
#[get("/1/company/details")]
pub async fn company_details(db: DbConn, auth: AuthenticatedUser) -> ApiResult<Json<CompanyDetails>> {
    let company_id = auth.company_id();
    let company = db
        .run(move |conn| get_company_by_id(conn, company_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Company not found."))?;
    Ok(Json(CompanyDetails {
        name: company.name,
        company_code: company.company_code,
    }))
}

/// Super Admin Dashboard endpoint.
///
/// - **URL:** `/api/1/superadmin/dashboard`
/// - **Method:** `GET`
/// - **Authentication:** super_admin only
///
/// Totals across every tenant plus one row per company, newest first.
#[get("/1/superadmin/dashboard")]
pub async fn superadmin_dashboard(
    db: DbConn,
    _admin: SuperAdminUser,
    clock: &State<ClockHandle>,
) -> ApiResult<Json<PlatformStats>> {
    let now = clock.now_utc();
    let stats = db.run(move |conn| platform_stats(conn, now)).await?;
    Ok(Json(stats))
}

pub fn routes() -> Vec<Route> {
    routes![company_details, superadmin_dashboard]
}
