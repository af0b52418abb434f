use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::error::{ApiError, ApiResult};
use crate::identity::Principal;
use crate::models::{Goal, GoalFields, NewGoal, NewPerformanceReview, PerformanceReview, ReviewFields};
use crate::orm::user::{ownership_of, require_in_company};
use crate::policy::{self, Ownership, can_manage, can_view, is_owner};
use crate::schema::{goals, performance_reviews};

pub const GOAL_STATUSES: [&str; 3] = ["not_started", "in_progress", "completed"];
pub const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

fn employee_ownership(
    conn: &mut SqliteConnection,
    company_id: i32,
    employee_id: i32,
) -> ApiResult<Ownership> {
    require_in_company(conn, company_id, employee_id)
        .map_err(|e| match e {
            ApiError::NotFound(_) => ApiError::not_found("Employee not found in your company."),
            other => other,
        })?;
    Ok(ownership_of(conn, company_id, employee_id)?)
}

fn find_goal(conn: &mut SqliteConnection, company_id: i32, goal_id: i32) -> ApiResult<Goal> {
    goals::table
        .filter(goals::company_id.eq(company_id))
        .filter(goals::id.eq(goal_id))
        .select(Goal::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Goal not found."))
}

// Goals

pub fn goals_for(
    conn: &mut SqliteConnection,
    principal: &Principal,
    company_id: i32,
    employee_id: i32,
) -> ApiResult<Vec<Goal>> {
    let target = employee_ownership(conn, company_id, employee_id)?;
    policy::require(can_view(principal, &target), "You cannot view goals for this employee.")?;
    Ok(goals::table
        .filter(goals::company_id.eq(company_id))
        .filter(goals::employee_id.eq(employee_id))
        .order((goals::target_date.asc(), goals::id.asc()))
        .select(Goal::as_select())
        .load(conn)?)
}

pub fn set_goal(
    conn: &mut SqliteConnection,
    setter: &Principal,
    company_id: i32,
    fields: GoalFields,
) -> ApiResult<Goal> {
    if fields.goal_description.trim().is_empty() {
        return Err(ApiError::validation("Goal description is required."));
    }
    let target = employee_ownership(conn, company_id, fields.employee_id)?;
    policy::require(
        can_manage(setter, &target),
        "You can only set goals for employees in your own department.",
    )?;
    diesel::insert_into(goals::table)
        .values(&NewGoal {
            company_id,
            employee_id: fields.employee_id,
            set_by_id: setter.id,
            goal_description: fields.goal_description.trim().to_string(),
            target_date: fields.target_date,
            status: GOAL_STATUSES[0].to_string(),
        })
        .execute(conn)?;
    Ok(goals::table
        .filter(goals::company_id.eq(company_id))
        .order(goals::id.desc())
        .select(Goal::as_select())
        .first(conn)?)
}

/// Only the employee the goal belongs to moves it along.
pub fn set_goal_status(
    conn: &mut SqliteConnection,
    actor: &Principal,
    company_id: i32,
    goal_id: i32,
    status: &str,
) -> ApiResult<Goal> {
    let status = status.trim().to_ascii_lowercase();
    if !GOAL_STATUSES.contains(&status.as_str()) {
        return Err(ApiError::validation(format!(
            "Invalid goal status. Expected one of: {}.",
            GOAL_STATUSES.join(", ")
        )));
    }
    let goal = find_goal(conn, company_id, goal_id)?;
    policy::require(
        is_owner(actor, &Ownership::owned_by(goal.employee_id, None)),
        "You can only update the status of your own goals.",
    )?;
    diesel::update(goals::table.find(goal.id))
        .set(goals::status.eq(&status))
        .execute(conn)?;
    find_goal(conn, company_id, goal.id)
}

pub fn delete_goal(conn: &mut SqliteConnection, actor: &Principal, company_id: i32, goal_id: i32) -> ApiResult<()> {
    let goal = find_goal(conn, company_id, goal_id)?;
    policy::require(goal.set_by_id == actor.id, "You can only delete goals that you have set.")?;
    diesel::delete(goals::table.find(goal.id)).execute(conn)?;
    Ok(())
}

// Reviews

pub fn reviews_for(
    conn: &mut SqliteConnection,
    principal: &Principal,
    company_id: i32,
    employee_id: i32,
) -> ApiResult<Vec<PerformanceReview>> {
    let target = employee_ownership(conn, company_id, employee_id)?;
    policy::require(can_view(principal, &target), "You cannot view reviews for this employee.")?;
    Ok(performance_reviews::table
        .filter(performance_reviews::company_id.eq(company_id))
        .filter(performance_reviews::employee_id.eq(employee_id))
        .order((performance_reviews::created_at.desc(), performance_reviews::id.desc()))
        .select(PerformanceReview::as_select())
        .load(conn)?)
}

pub fn add_review(
    conn: &mut SqliteConnection,
    reviewer: &Principal,
    company_id: i32,
    fields: ReviewFields,
    now: NaiveDateTime,
) -> ApiResult<PerformanceReview> {
    if !RATING_RANGE.contains(&fields.rating) {
        return Err(ApiError::validation("Rating must be between 1 and 5."));
    }
    if fields.review_period.trim().is_empty() {
        return Err(ApiError::validation("Review period is required."));
    }
    let target = employee_ownership(conn, company_id, fields.employee_id)?;
    policy::require(
        can_manage(reviewer, &target),
        "You can only review employees in your own department.",
    )?;
    diesel::insert_into(performance_reviews::table)
        .values(&NewPerformanceReview {
            company_id,
            employee_id: fields.employee_id,
            reviewer_id: reviewer.id,
            review_period: fields.review_period.trim().to_string(),
            rating: fields.rating,
            comments: fields.comments,
            created_at: now,
        })
        .execute(conn)?;
    Ok(performance_reviews::table
        .filter(performance_reviews::company_id.eq(company_id))
        .order(performance_reviews::id.desc())
        .select(PerformanceReview::as_select())
        .first(conn)?)
}
