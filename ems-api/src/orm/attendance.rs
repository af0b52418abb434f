//! Persists the daily attendance transitions decided in
//! [`crate::attendance`].

use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use diesel::prelude::*;

use crate::attendance::{DayContext, DayState, MarkRejected, Transition, decide};
use crate::error::ApiResult;
use crate::identity::Principal;
use crate::models::{AttendanceRecord, AttendanceView, LeaveStatus, NewAttendance};
use crate::orm::settings::{company_local_now, is_holiday, office_start};
use crate::orm::user::{name_of, names_by_id, visibility_for};
use crate::schema::{attendance, leave_requests};

#[derive(Debug, Clone, Default)]
pub struct MarkLocation {
    pub clock_in_location: Option<String>,
    pub clock_out_location: Option<String>,
}

fn record_for_day(
    conn: &mut SqliteConnection,
    user_id: i32,
    date: NaiveDate,
) -> QueryResult<Option<AttendanceRecord>> {
    attendance::table
        .filter(attendance::user_id.eq(user_id))
        .filter(attendance::date.eq(date))
        .select(AttendanceRecord::as_select())
        .first(conn)
        .optional()
}

pub fn on_approved_leave(
    conn: &mut SqliteConnection,
    user_id: i32,
    date: NaiveDate,
) -> QueryResult<bool> {
    let count: i64 = leave_requests::table
        .filter(leave_requests::requestor_id.eq(user_id))
        .filter(leave_requests::status.eq(LeaveStatus::Approved.as_str()))
        .filter(leave_requests::start_date.le(date))
        .filter(leave_requests::end_date.ge(date))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Clocks the principal in or out for the company-local day.
///
/// Clock-in is an insert that does nothing when a row for the day already
/// exists, and clock-out only touches a row whose `clock_out` is still
/// empty, so two racing requests cannot both succeed.
pub fn mark(
    conn: &mut SqliteConnection,
    principal: &Principal,
    company_id: i32,
    now_utc: NaiveDateTime,
    fallback_tz: Tz,
    location: MarkLocation,
) -> ApiResult<(Transition, AttendanceRecord)> {
    let local = company_local_now(conn, company_id, now_utc, fallback_tz)?;
    let today = local.date();

    let existing = record_for_day(conn, principal.id, today)?;
    let state = existing
        .as_ref()
        .map(|r| DayState::from_record(r.clock_in.is_some(), r.clock_out.is_some()))
        .unwrap_or(DayState::NoRecord);
    let ctx = DayContext {
        state,
        is_holiday: is_holiday(conn, company_id, today)?,
        on_approved_leave: on_approved_leave(conn, principal.id, today)?,
        office_start: office_start(conn, company_id)?,
    };

    let transition = decide(&ctx, local.time())?;
    match transition {
        Transition::ClockIn(status) => {
            let inserted = diesel::insert_into(attendance::table)
                .values(&NewAttendance {
                    user_id: principal.id,
                    company_id,
                    date: today,
                    clock_in: Some(now_utc),
                    status: status.as_str().to_string(),
                    clock_in_location: location.clock_in_location,
                })
                .on_conflict_do_nothing()
                .execute(conn)?;
            if inserted == 0 {
                return Err(MarkRejected::AlreadyClockedIn.into());
            }
        }
        Transition::ClockOut => {
            let updated = diesel::update(
                attendance::table
                    .filter(attendance::user_id.eq(principal.id))
                    .filter(attendance::date.eq(today))
                    .filter(attendance::clock_out.is_null()),
            )
            .set((
                attendance::clock_out.eq(Some(now_utc)),
                attendance::clock_out_location.eq(location.clock_out_location),
            ))
            .execute(conn)?;
            if updated == 0 {
                return Err(MarkRejected::AlreadyClockedOut.into());
            }
        }
    }

    let record = record_for_day(conn, principal.id, today)?.ok_or_else(|| {
        crate::error::ApiError::internal("attendance row vanished after write")
    })?;
    Ok((transition, record))
}

pub fn my_records(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<Vec<AttendanceRecord>> {
    attendance::table
        .filter(attendance::user_id.eq(user_id))
        .order(attendance::date.desc())
        .select(AttendanceRecord::as_select())
        .load(conn)
}

/// Records the principal may see, newest day first.
pub fn list_visible(
    conn: &mut SqliteConnection,
    principal: &Principal,
    company_id: i32,
) -> QueryResult<Vec<AttendanceView>> {
    let visibility = visibility_for(conn, principal)?;
    let mut query = attendance::table
        .filter(attendance::company_id.eq(company_id))
        .order((attendance::date.desc(), attendance::user_id.asc()))
        .select(AttendanceRecord::as_select())
        .into_boxed();
    if let Some(ids) = visibility.owner_ids() {
        query = query.filter(attendance::user_id.eq_any(ids));
    }
    let records = query.load(conn)?;

    let mut ids: Vec<i32> = records.iter().map(|r| r.user_id).collect();
    ids.sort_unstable();
    ids.dedup();
    let names = names_by_id(conn, &ids)?;
    Ok(records
        .into_iter()
        .map(|record| AttendanceView {
            user_name: name_of(&names, record.user_id),
            record,
        })
        .collect())
}
