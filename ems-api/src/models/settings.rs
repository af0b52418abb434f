use chrono::NaiveDate;
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::{company_settings, designations, holidays};

/// A job title and the role people holding it are given.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = designations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct Designation {
    pub id: i32,
    pub company_id: i32,
    pub title: String,
    pub maps_to_role: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = designations)]
pub struct NewDesignation {
    pub company_id: i32,
    pub title: String,
    pub maps_to_role: String,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = company_settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CompanySetting {
    pub id: i32,
    pub company_id: i32,
    pub key: String,
    pub value: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = company_settings)]
pub struct NewCompanySetting {
    pub company_id: i32,
    pub key: String,
    pub value: String,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = holidays)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct Holiday {
    pub id: i32,
    pub company_id: i32,
    #[ts(type = "string")]
    pub holiday_date: NaiveDate,
    pub description: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = holidays)]
pub struct NewHoliday {
    pub company_id: i32,
    pub holiday_date: NaiveDate,
    pub description: String,
}
