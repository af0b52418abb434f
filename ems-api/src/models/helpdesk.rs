use chrono::NaiveDateTime;
use diesel::{Associations, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::{helpdesk_tickets, ticket_replies};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = helpdesk_tickets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct HelpdeskTicket {
    pub id: i32,
    pub company_id: i32,
    pub raised_by_id: i32,
    pub raised_by_name: String,
    pub subject: String,
    pub description: String,
    pub category: String,
    pub status: String,
    #[serde(with = "crate::timestamps")]
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = helpdesk_tickets)]
pub struct NewHelpdeskTicket {
    pub company_id: i32,
    pub raised_by_id: i32,
    pub raised_by_name: String,
    pub subject: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(
    Queryable, Selectable, Identifiable, Associations, Debug, Clone, Serialize, Deserialize, TS,
)]
#[diesel(belongs_to(HelpdeskTicket))]
#[diesel(table_name = ticket_replies)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct TicketReply {
    pub id: i32,
    pub helpdesk_ticket_id: i32,
    pub replied_by_id: i32,
    pub replied_by_name: String,
    pub reply_text: String,
    #[serde(with = "crate::timestamps")]
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = ticket_replies)]
pub struct NewTicketReply {
    pub helpdesk_ticket_id: i32,
    pub replied_by_id: i32,
    pub replied_by_name: String,
    pub reply_text: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct TicketWithReplies {
    #[serde(flatten)]
    pub ticket: HelpdeskTicket,
    pub replies: Vec<TicketReply>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TicketFields {
    pub subject: String,
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "General".to_string()
}
