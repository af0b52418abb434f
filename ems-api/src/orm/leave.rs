use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{ApiError, ApiResult};
use crate::identity::Principal;
use crate::models::{LeaveRequest, LeaveStatus, NewLeaveRequest, User};
use crate::orm::notification;
use crate::orm::user::{ownership_of, visibility_for};
use crate::policy::{self, can_manage};
use crate::schema::leave_requests;

pub const LEAVE_NOT_FOUND: &str = "Leave request not found.";

const OVERLAP_MESSAGE: &str = "You already have a pending or approved leave request for these dates.";

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LeaveApplication {
    pub leave_type: String,
    #[ts(type = "string")]
    pub start_date: NaiveDate,
    #[ts(type = "string")]
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: String,
}

/// Requests the principal may see, newest first.
pub fn list_visible(
    conn: &mut SqliteConnection,
    principal: &Principal,
    company_id: i32,
) -> QueryResult<Vec<LeaveRequest>> {
    let visibility = visibility_for(conn, principal)?;
    let mut query = leave_requests::table
        .filter(leave_requests::company_id.eq(company_id))
        .order((leave_requests::created_at.desc(), leave_requests::id.desc()))
        .select(LeaveRequest::as_select())
        .into_boxed();
    if let Some(ids) = visibility.owner_ids() {
        query = query.filter(leave_requests::requestor_id.eq_any(ids));
    }
    query.load(conn)
}

/// Pending or approved requests of `requestor_id` touching the given range,
/// not counting `exclude`.
fn live_overlaps(
    conn: &mut SqliteConnection,
    requestor_id: i32,
    start_date: NaiveDate,
    end_date: NaiveDate,
    exclude: Option<i32>,
) -> QueryResult<i64> {
    let mut query = leave_requests::table
        .filter(leave_requests::requestor_id.eq(requestor_id))
        .filter(leave_requests::status.ne(LeaveStatus::Rejected.as_str()))
        .filter(leave_requests::start_date.le(end_date))
        .filter(leave_requests::end_date.ge(start_date))
        .into_boxed();
    if let Some(id) = exclude {
        query = query.filter(leave_requests::id.ne(id));
    }
    query.count().get_result(conn)
}

/// Files a pending request. The overlap check and the insert share one
/// immediate transaction, so concurrent applications cannot both pass.
pub fn apply(
    conn: &mut SqliteConnection,
    requestor: &User,
    application: LeaveApplication,
    now: NaiveDateTime,
) -> ApiResult<LeaveRequest> {
    if application.start_date > application.end_date {
        return Err(ApiError::validation("Start date cannot be after end date."));
    }
    if application.leave_type.trim().is_empty() {
        return Err(ApiError::validation("Leave type is required."));
    }

    conn.immediate_transaction(|conn| {
        let overlapping = live_overlaps(
            conn,
            requestor.id,
            application.start_date,
            application.end_date,
            None,
        )?;
        if overlapping > 0 {
            return Err(ApiError::conflict(OVERLAP_MESSAGE));
        }

        let requestor_name = requestor.full_name();
        diesel::insert_into(leave_requests::table)
            .values(&NewLeaveRequest {
                company_id: requestor.company_id,
                requestor_id: requestor.id,
                requestor_name: requestor_name.clone(),
                leave_type: application.leave_type.trim().to_string(),
                start_date: application.start_date,
                end_date: application.end_date,
                reason: application.reason,
                status: LeaveStatus::Pending.as_str().to_string(),
                created_at: now,
            })
            .execute(conn)?;
        notification::record(
            conn,
            requestor.company_id,
            format!("{} applied for {}.", requestor_name, application.leave_type.trim()),
            now,
        )?;

        Ok(leave_requests::table
            .filter(leave_requests::requestor_id.eq(requestor.id))
            .order(leave_requests::id.desc())
            .select(LeaveRequest::as_select())
            .first(conn)?)
    })
}

/// Approves, rejects or reopens a request. Department managers may only act
/// on requests from their own department. Reviving a rejected request is a
/// conflict when the requestor has since filed another live one over the
/// same dates.
pub fn set_status(
    conn: &mut SqliteConnection,
    actor: &User,
    actor_principal: &Principal,
    request_id: i32,
    status: LeaveStatus,
    now: NaiveDateTime,
) -> ApiResult<LeaveRequest> {
    let company_id = actor.company_id;
    conn.immediate_transaction(|conn| {
        let request = leave_requests::table
            .filter(leave_requests::company_id.eq(company_id))
            .filter(leave_requests::id.eq(request_id))
            .select(LeaveRequest::as_select())
            .first(conn)
            .optional()?
            .ok_or_else(|| ApiError::not_found(LEAVE_NOT_FOUND))?;

        let target = ownership_of(conn, company_id, request.requestor_id)?;
        policy::require(
            can_manage(actor_principal, &target),
            "You can only manage leave requests for your own department.",
        )?;

        let was_rejected = request.status == LeaveStatus::Rejected.as_str();
        if was_rejected && status != LeaveStatus::Rejected {
            let overlapping = live_overlaps(
                conn,
                request.requestor_id,
                request.start_date,
                request.end_date,
                Some(request.id),
            )?;
            if overlapping > 0 {
                return Err(ApiError::conflict(OVERLAP_MESSAGE));
            }
        }

        diesel::update(leave_requests::table.find(request.id))
            .set((
                leave_requests::status.eq(status.as_str()),
                leave_requests::action_by_id.eq(Some(actor.id)),
                leave_requests::action_by_name.eq(Some(actor.full_name())),
                leave_requests::action_timestamp.eq(Some(now)),
            ))
            .execute(conn)?;
        notification::record(
            conn,
            company_id,
            format!(
                "Your {} request from {} was {} by {}.",
                request.leave_type,
                request.start_date,
                status.as_str(),
                actor.first_name
            ),
            now,
        )?;

        Ok(leave_requests::table
            .find(request.id)
            .select(LeaveRequest::as_select())
            .first(conn)?)
    })
}
