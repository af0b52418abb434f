//! Onboarding checklist endpoints.

use rocket::serde::json::Json;
use rocket::{Route, State};

use crate::api::MessageResponse;
use crate::auth_guards::AuthenticatedUser;
use crate::broadcaster::{Broadcaster, Topic};
use crate::clock::ClockHandle;
use crate::error::ApiResult;
use crate::logged_json::LoggedJson;
use crate::models::{ChecklistItem, ChecklistUpdate};
use crate::orm::DbConn;
use crate::orm::onboarding::{checklist_for, save_checklist};

/// Onboarding Checklist endpoint.
///
/// - **URL:** `/api/1/onboarding/<employee_id>`
/// - **Method:** `GET`
/// - **Authentication:** the employee, their department manager, or HR
///
/// An employee without a saved checklist gets `[]`.
#[get("/1/onboarding/<employee_id>")]
pub async fn checklist(
    db: DbConn,
    auth: AuthenticatedUser,
    employee_id: i32,
) -> ApiResult<Json<Vec<ChecklistItem>>> {
    let company_id = auth.company_id();
    let items = db
        .run(move |conn| checklist_for(conn, &auth.principal, company_id, employee_id))
        .await?;
    Ok(Json(items))
}

/// Replaces an employee's checklist.
///
/// ```json
/// {
///   "employee_id": 7,
///   "tasks": [{"text": "Sign contract", "completed": true}]
/// }
/// ```
#[post("/1/onboarding", data = "<update>")]
pub async fn save(
    db: DbConn,
    auth: AuthenticatedUser,
    clock: &State<ClockHandle>,
    bus: &State<Broadcaster>,
    update: LoggedJson<ChecklistUpdate>,
) -> ApiResult<Json<MessageResponse>> {
    let update = update.into_inner();
    let employee_id = update.employee_id;
    let company_id = auth.company_id();
    let now = clock.now_utc();
    let actor = auth.principal.clone();
    let items = db
        .run(move |conn| save_checklist(conn, &actor, company_id, update, now))
        .await?;
    info!(
        "Onboarding checklist of employee {} saved by {} ({} items)",
        employee_id,
        auth.user.email,
        items.len()
    );
    bus.publish(Topic::OnboardingUpdated);
    Ok(Json(MessageResponse::new("Checklist updated successfully.")))
}

pub fn routes() -> Vec<Route> {
    routes![checklist, save]
}
