pub mod announcement;
pub mod attendance;
pub mod auth;
pub mod chat;
pub mod company;
pub mod department;
pub mod document;
pub mod employee;
pub mod events;
pub mod helpdesk;
pub mod leave;
pub mod notification;
pub mod onboarding;
pub mod payroll;
pub mod performance;
pub mod reports;
pub mod settings;
pub mod status;
pub mod task;

use rocket::Route;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Body of endpoints that only confirm an action.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{"status": "..."}`, shared by every status-change endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusRequest {
    pub status: String,
}

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(announcement::routes());
    routes.extend(attendance::routes());
    routes.extend(auth::routes());
    routes.extend(chat::routes());
    routes.extend(company::routes());
    routes.extend(department::routes());
    routes.extend(document::routes());
    routes.extend(employee::routes());
    routes.extend(events::routes());
    routes.extend(helpdesk::routes());
    routes.extend(leave::routes());
    routes.extend(notification::routes());
    routes.extend(onboarding::routes());
    routes.extend(payroll::routes());
    routes.extend(performance::routes());
    routes.extend(reports::routes());
    routes.extend(settings::routes());
    routes.extend(status::routes());
    routes.extend(task::routes());
    routes
}
