use chrono::NaiveDateTime;
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::onboarding_checklists;

/// Stored checklist. `items` holds the JSON-encoded [`ChecklistItem`] list.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = onboarding_checklists)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OnboardingChecklist {
    pub id: i32,
    pub company_id: i32,
    pub user_id: i32,
    pub items: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = onboarding_checklists)]
pub struct ChecklistRow {
    pub company_id: i32,
    pub user_id: i32,
    pub items: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChecklistItem {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// Replaces an employee's whole checklist.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChecklistUpdate {
    pub employee_id: i32,
    pub tasks: Vec<ChecklistItem>,
}
