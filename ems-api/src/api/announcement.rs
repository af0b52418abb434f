use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::api::MessageResponse;
use crate::auth_guards::{AuthenticatedUser, HrUser};
use crate::broadcaster::{Broadcaster, Topic};
use crate::clock::ClockHandle;
use crate::error::ApiResult;
use crate::logged_json::LoggedJson;
use crate::models::Announcement;
use crate::orm::DbConn;
use crate::orm::announcement::{latest, post, remove};

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnnouncementRequest {
    pub content: String,
}

/// The company board, newest first.
#[get("/1/announcements")]
pub async fn list(db: DbConn, auth: AuthenticatedUser) -> ApiResult<Json<Vec<Announcement>>> {
    let company_id = auth.company_id();
    Ok(Json(db.run(move |conn| latest(conn, company_id)).await?))
}

#[post("/1/announcements", data = "<request>")]
pub async fn create(
    db: DbConn,
    auth: HrUser,
    clock: &State<ClockHandle>,
    bus: &State<Broadcaster>,
    request: LoggedJson<AnnouncementRequest>,
) -> ApiResult<status::Created<Json<Announcement>>> {
    let content = request.into_inner().content;
    let now = clock.now_utc();
    let announcement = db
        .run(move |conn| post(conn, &auth.user, &content, now))
        .await?;
    bus.publish(Topic::AnnouncementUpdated);
    Ok(status::Created::new(format!("/api/1/announcements/{}", announcement.id))
        .body(Json(announcement)))
}

#[delete("/1/announcements/<id>")]
pub async fn delete_announcement(
    db: DbConn,
    auth: HrUser,
    clock: &State<ClockHandle>,
    bus: &State<Broadcaster>,
    id: i32,
) -> ApiResult<Json<MessageResponse>> {
    let company_id = auth.company_id();
    let now = clock.now_utc();
    db.run(move |conn| remove(conn, company_id, id, now)).await?;
    bus.publish(Topic::AnnouncementUpdated);
    Ok(Json(MessageResponse::new("Announcement deleted.")))
}

pub fn routes() -> Vec<Route> {
    routes![list, create, delete_announcement]
}
