//! Liveness endpoint.

use diesel::RunQueryDsl;
use rocket::{Route, serde::json::Json};
use serde::Serialize;
use ts_rs::TS;

use crate::built_info;
use crate::orm::DbConn;

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct ServiceStatus {
    pub status: &'static str,
    /// `"ok"` when a trivial query succeeds, `"unavailable"` otherwise.
    pub database: &'static str,
    pub version: &'static str,
    pub built_at: &'static str,
    pub git_commit: Option<&'static str>,
}

/// Service Status endpoint.
///
/// - **URL:** `/api/1/status`
/// - **Method:** `GET`
/// - **Authentication:** None
///
/// Always answers 200 while the process is up; a broken database shows up
/// in the `database` field only.
#[get("/1/status")]
pub async fn service_status(db: DbConn) -> Json<ServiceStatus> {
    let database = match db.run(|conn| diesel::sql_query("SELECT 1").execute(conn)).await {
        Ok(_) => "ok",
        Err(e) => {
            warn!("Status check could not reach the database: {}", e);
            "unavailable"
        }
    };
    Json(ServiceStatus {
        status: "running",
        database,
        version: built_info::PKG_VERSION,
        built_at: built_info::BUILT_TIME_UTC,
        git_commit: built_info::GIT_COMMIT_HASH,
    })
}

pub fn routes() -> Vec<Route> {
    routes![service_status]
}
