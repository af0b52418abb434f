use chrono::{NaiveDate, NaiveDateTime};
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::{goals, performance_reviews};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct Goal {
    pub id: i32,
    pub company_id: i32,
    pub employee_id: i32,
    pub set_by_id: i32,
    pub goal_description: String,
    #[ts(type = "string")]
    pub target_date: NaiveDate,
    pub status: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = goals)]
pub struct NewGoal {
    pub company_id: i32,
    pub employee_id: i32,
    pub set_by_id: i32,
    pub goal_description: String,
    pub target_date: NaiveDate,
    pub status: String,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = performance_reviews)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct PerformanceReview {
    pub id: i32,
    pub company_id: i32,
    pub employee_id: i32,
    pub reviewer_id: i32,
    pub review_period: String,
    pub rating: i32,
    pub comments: Option<String>,
    #[serde(with = "crate::timestamps")]
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = performance_reviews)]
pub struct NewPerformanceReview {
    pub company_id: i32,
    pub employee_id: i32,
    pub reviewer_id: i32,
    pub review_period: String,
    pub rating: i32,
    pub comments: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GoalFields {
    pub employee_id: i32,
    pub goal_description: String,
    #[ts(type = "string")]
    pub target_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReviewFields {
    pub employee_id: i32,
    pub review_period: String,
    pub rating: i32,
    #[serde(default)]
    pub comments: Option<String>,
}
