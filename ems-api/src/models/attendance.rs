use chrono::{NaiveDate, NaiveDateTime};
use diesel::{Associations, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::attendance;

/// One principal's attendance for one tenant-local day.
#[derive(
    Queryable, Selectable, Identifiable, Associations, Debug, Clone, Serialize, Deserialize, TS,
)]
#[diesel(belongs_to(crate::models::user::User))]
#[diesel(table_name = attendance)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct AttendanceRecord {
    pub id: i32,
    pub user_id: i32,
    pub company_id: i32,
    #[ts(type = "string")]
    pub date: NaiveDate,
    #[serde(with = "crate::timestamps::option")]
    #[ts(type = "string | null")]
    pub clock_in: Option<NaiveDateTime>,
    #[serde(with = "crate::timestamps::option")]
    #[ts(type = "string | null")]
    pub clock_out: Option<NaiveDateTime>,
    pub status: String,
    pub clock_in_location: Option<String>,
    pub clock_out_location: Option<String>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = attendance)]
pub struct NewAttendance {
    pub user_id: i32,
    pub company_id: i32,
    pub date: NaiveDate,
    pub clock_in: Option<NaiveDateTime>,
    pub status: String,
    pub clock_in_location: Option<String>,
}

/// Attendance row joined with the principal's name, for manager views.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct AttendanceView {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub user_name: String,
}
