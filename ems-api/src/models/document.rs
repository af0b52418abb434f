use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::documents;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct Document {
    pub id: i32,
    pub company_id: i32,
    /// `None` for company-wide documents.
    pub employee_id: Option<i32>,
    pub uploaded_by_id: i32,
    pub document_name: String,
    pub document_type: String,
    pub file_url: String,
    #[serde(with = "crate::timestamps")]
    #[ts(type = "string")]
    pub uploaded_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = documents)]
pub struct NewDocument {
    pub company_id: i32,
    pub employee_id: Option<i32>,
    pub uploaded_by_id: i32,
    pub document_name: String,
    pub document_type: String,
    pub file_url: String,
    pub uploaded_at: NaiveDateTime,
}
