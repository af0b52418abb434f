use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::{companies, super_admins};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = companies)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct Company {
    pub id: i32,
    pub company_code: String,
    pub name: String,
    pub owner_email: String,
    #[serde(with = "crate::timestamps")]
    #[ts(type = "string")]
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = companies)]
pub struct NewCompany {
    pub company_code: String,
    pub name: String,
    pub owner_email: String,
    pub created_at: chrono::NaiveDateTime,
}

/// Platform operator. Not a member of any company.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = super_admins)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SuperAdmin {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
}

#[derive(Insertable)]
#[diesel(table_name = super_admins)]
pub struct NewSuperAdmin {
    pub email: String,
    pub password_hash: String,
}
