use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::{announcements, chat_messages, notifications};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = announcements)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct Announcement {
    pub id: i32,
    pub company_id: i32,
    pub content: String,
    pub author_name: String,
    #[serde(with = "crate::timestamps")]
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = announcements)]
pub struct NewAnnouncement {
    pub company_id: i32,
    pub content: String,
    pub author_name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = chat_messages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct ChatMessage {
    pub id: i32,
    pub company_id: i32,
    pub user_id: i32,
    pub user_name: String,
    pub message: String,
    #[serde(with = "crate::timestamps")]
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = chat_messages)]
pub struct NewChatMessage {
    pub company_id: i32,
    pub user_id: i32,
    pub user_name: String,
    pub message: String,
    pub created_at: NaiveDateTime,
}

/// Persisted activity line shown in the tenant's notification feed.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct Notification {
    pub id: i32,
    pub company_id: i32,
    pub message: String,
    #[serde(with = "crate::timestamps")]
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub company_id: i32,
    pub message: String,
    pub created_at: NaiveDateTime,
}
