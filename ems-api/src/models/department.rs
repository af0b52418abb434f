use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::departments;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = departments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct Department {
    pub id: i32,
    pub company_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<i32>,
    pub is_active: bool,
}

#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = departments)]
#[diesel(treat_none_as_null = true)]
pub struct DepartmentInput {
    pub company_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<i32>,
    pub is_active: bool,
}

/// Department as listed, with the manager's display name and head count.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct DepartmentView {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub manager_id: Option<i32>,
    pub manager_name: Option<String>,
    pub employee_count: i64,
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Department fields as submitted on create and update.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DepartmentFields {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `0` is treated as "no manager".
    #[serde(default)]
    pub manager_id: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl DepartmentFields {
    pub fn into_input(self, company_id: i32) -> DepartmentInput {
        DepartmentInput {
            company_id,
            name: self.name.trim().to_string(),
            description: self.description,
            manager_id: self.manager_id.filter(|id| *id != 0),
            is_active: self.is_active,
        }
    }
}
