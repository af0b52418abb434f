use chrono::NaiveDate;
use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::tasks;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Some(TaskStatus::Todo),
            "in_progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct Task {
    pub id: i32,
    pub company_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to_id: i32,
    pub assigned_by_id: i32,
    #[ts(type = "string")]
    pub due_date: NaiveDate,
    pub priority: String,
    pub status: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = tasks)]
pub struct NewTask {
    pub company_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to_id: i32,
    pub assigned_by_id: i32,
    pub due_date: NaiveDate,
    pub priority: String,
    pub status: String,
}

#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChanges {
    pub title: String,
    pub description: Option<String>,
    pub assigned_to_id: i32,
    pub due_date: NaiveDate,
    pub priority: String,
}

/// Task with the names of the people on both ends.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub assigned_to_name: String,
    pub assigned_by_name: String,
}

/// Task fields as submitted on create and update.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaskFields {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub assigned_to_id: i32,
    #[ts(type = "string")]
    pub due_date: NaiveDate,
    #[serde(default = "default_priority")]
    pub priority: String,
}

fn default_priority() -> String {
    "medium".to_string()
}
