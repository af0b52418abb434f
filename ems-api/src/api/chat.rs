//! Company chat room.
//!
//! Posted messages are stored, then pushed to the `/events` stream of every
//! subscriber of the same company.

use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::auth_guards::AuthenticatedUser;
use crate::broadcaster::{Broadcaster, ChatEvent, Topic};
use crate::clock::ClockHandle;
use crate::error::ApiResult;
use crate::logged_json::LoggedJson;
use crate::models::ChatMessage;
use crate::orm::DbConn;
use crate::orm::chat::{history, post};

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChatRequest {
    pub message: String,
}

#[get("/1/chat")]
pub async fn list(db: DbConn, auth: AuthenticatedUser) -> ApiResult<Json<Vec<ChatMessage>>> {
    let company_id = auth.company_id();
    Ok(Json(db.run(move |conn| history(conn, company_id)).await?))
}

#[post("/1/chat", data = "<request>")]
pub async fn send(
    db: DbConn,
    auth: AuthenticatedUser,
    clock: &State<ClockHandle>,
    bus: &State<Broadcaster>,
    request: LoggedJson<ChatRequest>,
) -> ApiResult<status::Created<Json<ChatMessage>>> {
    let text = request.into_inner().message;
    let now = clock.now_utc();
    let message = db
        .run(move |conn| post(conn, &auth.user, &text, now))
        .await?;

    bus.publish_chat(
        message.company_id,
        ChatEvent {
            id: message.id,
            user_id: message.user_id,
            user_name: message.user_name.clone(),
            message: message.message.clone(),
            created_at: message.created_at,
        },
    );
    bus.publish(Topic::NewChatMessage);
    Ok(status::Created::new("/api/1/chat").body(Json(message)))
}

pub fn routes() -> Vec<Route> {
    routes![list, send]
}
