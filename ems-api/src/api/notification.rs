use rocket::Route;
use rocket::serde::json::Json;

use crate::auth_guards::AuthenticatedUser;
use crate::error::ApiResult;
use crate::models::Notification;
use crate::orm::DbConn;
use crate::orm::notification::latest;

/// The ten most recent notifications of the caller's company.
#[get("/1/notifications")]
pub async fn list(db: DbConn, auth: AuthenticatedUser) -> ApiResult<Json<Vec<Notification>>> {
    let company_id = auth.company_id();
    Ok(Json(db.run(move |conn| latest(conn, company_id)).await?))
}

pub fn routes() -> Vec<Route> {
    routes![list]
}
