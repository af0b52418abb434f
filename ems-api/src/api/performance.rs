//! Goals and performance reviews.

use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Route, State};

use crate::api::{MessageResponse, StatusRequest};
use crate::auth_guards::{AuthenticatedUser, ManagerUser};
use crate::broadcaster::{Broadcaster, Topic};
use crate::clock::ClockHandle;
use crate::error::ApiResult;
use crate::logged_json::LoggedJson;
use crate::models::{Goal, GoalFields, PerformanceReview, ReviewFields};
use crate::orm::DbConn;
use crate::orm::performance::{
    add_review, delete_goal, goals_for, reviews_for, set_goal, set_goal_status,
};

#[get("/1/performance/goals/<employee_id>")]
pub async fn goals(db: DbConn, auth: AuthenticatedUser, employee_id: i32) -> ApiResult<Json<Vec<Goal>>> {
    let company_id = auth.company_id();
    Ok(Json(
        db.run(move |conn| goals_for(conn, &auth.principal, company_id, employee_id))
            .await?,
    ))
}

#[post("/1/performance/goals", data = "<fields>")]
pub async fn create_goal(
    db: DbConn,
    auth: ManagerUser,
    bus: &State<Broadcaster>,
    fields: LoggedJson<GoalFields>,
) -> ApiResult<status::Created<Json<Goal>>> {
    let fields = fields.into_inner();
    let company_id = auth.company_id();
    let goal = db
        .run(move |conn| set_goal(conn, &auth.principal, company_id, fields))
        .await?;
    bus.publish(Topic::PerformanceUpdated);
    Ok(status::Created::new(format!("/api/1/performance/goals/{}", goal.employee_id)).body(Json(goal)))
}

/// Only the employee the goal belongs to moves it along.
#[patch("/1/performance/goals/<id>/status", data = "<request>")]
pub async fn update_goal_status(
    db: DbConn,
    auth: AuthenticatedUser,
    bus: &State<Broadcaster>,
    id: i32,
    request: LoggedJson<StatusRequest>,
) -> ApiResult<Json<Goal>> {
    let status = request.into_inner().status;
    let company_id = auth.company_id();
    let goal = db
        .run(move |conn| set_goal_status(conn, &auth.principal, company_id, id, &status))
        .await?;
    bus.publish(Topic::PerformanceUpdated);
    Ok(Json(goal))
}

#[delete("/1/performance/goals/<id>")]
pub async fn remove_goal(
    db: DbConn,
    auth: AuthenticatedUser,
    bus: &State<Broadcaster>,
    id: i32,
) -> ApiResult<Json<MessageResponse>> {
    let company_id = auth.company_id();
    db.run(move |conn| delete_goal(conn, &auth.principal, company_id, id))
        .await?;
    bus.publish(Topic::PerformanceUpdated);
    Ok(Json(MessageResponse::new("Goal deleted successfully.")))
}

#[get("/1/performance/reviews/<employee_id>")]
pub async fn reviews(
    db: DbConn,
    auth: AuthenticatedUser,
    employee_id: i32,
) -> ApiResult<Json<Vec<PerformanceReview>>> {
    let company_id = auth.company_id();
    Ok(Json(
        db.run(move |conn| reviews_for(conn, &auth.principal, company_id, employee_id))
            .await?,
    ))
}

#[post("/1/performance/reviews", data = "<fields>")]
pub async fn create_review(
    db: DbConn,
    auth: ManagerUser,
    clock: &State<ClockHandle>,
    bus: &State<Broadcaster>,
    fields: LoggedJson<ReviewFields>,
) -> ApiResult<status::Created<Json<PerformanceReview>>> {
    let fields = fields.into_inner();
    let company_id = auth.company_id();
    let now = clock.now_utc();
    let review = db
        .run(move |conn| add_review(conn, &auth.principal, company_id, fields, now))
        .await?;
    bus.publish(Topic::PerformanceUpdated);
    Ok(status::Created::new(format!("/api/1/performance/reviews/{}", review.employee_id))
        .body(Json(review)))
}

pub fn routes() -> Vec<Route> {
    routes![goals, create_goal, update_goal_status, remove_goal, reviews, create_review]
}
