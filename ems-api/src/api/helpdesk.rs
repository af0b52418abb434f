use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::api::StatusRequest;
use crate::auth_guards::{AuthenticatedUser, HrUser};
use crate::broadcaster::{Broadcaster, Topic};
use crate::clock::ClockHandle;
use crate::error::ApiResult;
use crate::logged_json::LoggedJson;
use crate::models::{HelpdeskTicket, TicketFields, TicketReply, TicketWithReplies};
use crate::orm::DbConn;
use crate::orm::helpdesk::{add_reply, get_ticket, list_visible, raise_ticket, set_status};

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReplyRequest {
    pub reply_text: String,
}

#[get("/1/helpdesk/tickets")]
pub async fn list(db: DbConn, auth: AuthenticatedUser) -> ApiResult<Json<Vec<HelpdeskTicket>>> {
    let company_id = auth.company_id();
    Ok(Json(
        db.run(move |conn| list_visible(conn, &auth.principal, company_id))
            .await?,
    ))
}

/// One ticket with its replies, oldest reply first.
#[get("/1/helpdesk/tickets/<id>")]
pub async fn show(db: DbConn, auth: AuthenticatedUser, id: i32) -> ApiResult<Json<TicketWithReplies>> {
    let company_id = auth.company_id();
    Ok(Json(
        db.run(move |conn| get_ticket(conn, &auth.principal, company_id, id))
            .await?,
    ))
}

#[post("/1/helpdesk/tickets", data = "<fields>")]
pub async fn create(
    db: DbConn,
    auth: AuthenticatedUser,
    clock: &State<ClockHandle>,
    bus: &State<Broadcaster>,
    fields: LoggedJson<TicketFields>,
) -> ApiResult<status::Created<Json<HelpdeskTicket>>> {
    let fields = fields.into_inner();
    let now = clock.now_utc();
    let ticket = db
        .run(move |conn| raise_ticket(conn, &auth.user, fields, now))
        .await?;
    info!("Ticket {} raised by user {}", ticket.id, ticket.raised_by_id);
    bus.publish(Topic::HelpdeskUpdated);
    Ok(status::Created::new(format!("/api/1/helpdesk/tickets/{}", ticket.id)).body(Json(ticket)))
}

#[put("/1/helpdesk/tickets/<id>/status", data = "<request>")]
pub async fn update_status(
    db: DbConn,
    auth: HrUser,
    clock: &State<ClockHandle>,
    bus: &State<Broadcaster>,
    id: i32,
    request: LoggedJson<StatusRequest>,
) -> ApiResult<Json<HelpdeskTicket>> {
    let status = request.into_inner().status;
    let company_id = auth.company_id();
    let now = clock.now_utc();
    let ticket = db
        .run(move |conn| set_status(conn, company_id, id, &status, now))
        .await?;
    bus.publish(Topic::HelpdeskUpdated);
    Ok(Json(ticket))
}

#[post("/1/helpdesk/tickets/<id>/replies", data = "<request>")]
pub async fn reply(
    db: DbConn,
    auth: AuthenticatedUser,
    clock: &State<ClockHandle>,
    bus: &State<Broadcaster>,
    id: i32,
    request: LoggedJson<ReplyRequest>,
) -> ApiResult<status::Created<Json<TicketReply>>> {
    let text = request.into_inner().reply_text;
    let now = clock.now_utc();
    let reply = db
        .run(move |conn| add_reply(conn, &auth.user, &auth.principal, id, &text, now))
        .await?;
    bus.publish(Topic::HelpdeskUpdated);
    Ok(status::Created::new(format!("/api/1/helpdesk/tickets/{id}")).body(Json(reply)))
}

pub fn routes() -> Vec<Route> {
    routes![list, show, create, update_status, reply]
}
