//! Per-company configuration: designations, holidays, office hours and
//! the timezone that defines the company's local day.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::attendance::{DEFAULT_OFFICE_END, DEFAULT_OFFICE_START, default_office_start, parse_office_time};
use crate::clock::{parse_timezone, resolve_timezone, to_local};
use crate::error::{ApiError, ApiResult};
use crate::identity::Role;
use crate::models::{Designation, Holiday, NewCompanySetting, NewDesignation, NewHoliday};
use crate::schema::{company_settings, designations, holidays, users};

pub const OFFICE_START_KEY: &str = "OfficeStartTime";
pub const OFFICE_END_KEY: &str = "OfficeEndTime";
pub const TIMEZONE_KEY: &str = "Timezone";

pub fn get_setting(conn: &mut SqliteConnection, company_id: i32, key: &str) -> QueryResult<Option<String>> {
    company_settings::table
        .filter(company_settings::company_id.eq(company_id))
        .filter(company_settings::key.eq(key))
        .select(company_settings::value)
        .first(conn)
        .optional()
}

pub fn put_setting(conn: &mut SqliteConnection, company_id: i32, key: &str, value: &str) -> QueryResult<()> {
    diesel::insert_into(company_settings::table)
        .values(&NewCompanySetting {
            company_id,
            key: key.to_string(),
            value: value.to_string(),
        })
        .on_conflict((company_settings::company_id, company_settings::key))
        .do_update()
        .set(company_settings::value.eq(value))
        .execute(conn)?;
    Ok(())
}

// Designations

pub fn list_designations(conn: &mut SqliteConnection, company_id: i32) -> QueryResult<Vec<Designation>> {
    designations::table
        .filter(designations::company_id.eq(company_id))
        .order(designations::title.asc())
        .select(Designation::as_select())
        .load(conn)
}

pub fn add_designation(
    conn: &mut SqliteConnection,
    company_id: i32,
    title: &str,
    maps_to_role: Role,
) -> ApiResult<Designation> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::validation("Designation title is required."));
    }
    if maps_to_role == Role::SuperAdmin {
        return Err(ApiError::validation("Designations cannot map to super_admin."));
    }
    diesel::insert_into(designations::table)
        .values(&NewDesignation {
            company_id,
            title: title.to_string(),
            maps_to_role: maps_to_role.as_str().to_string(),
        })
        .execute(conn)
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::conflict(format!("A designation named '{title}' already exists.")),
            other => other,
        })?;
    Ok(designations::table
        .filter(designations::company_id.eq(company_id))
        .filter(designations::title.eq(title))
        .select(Designation::as_select())
        .first(conn)?)
}

/// Refused while any employee holds the title.
pub fn delete_designation(conn: &mut SqliteConnection, company_id: i32, designation_id: i32) -> ApiResult<()> {
    let designation = designations::table
        .filter(designations::company_id.eq(company_id))
        .filter(designations::id.eq(designation_id))
        .select(Designation::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Designation not found."))?;

    let holders: i64 = users::table
        .filter(users::company_id.eq(company_id))
        .filter(users::designation.eq(&designation.title))
        .count()
        .get_result(conn)?;
    if holders > 0 {
        return Err(ApiError::validation(
            "Cannot delete this designation as it is currently assigned to one or more employees.",
        ));
    }
    diesel::delete(designations::table.find(designation.id)).execute(conn)?;
    Ok(())
}

// Holidays

pub fn list_holidays(conn: &mut SqliteConnection, company_id: i32) -> QueryResult<Vec<Holiday>> {
    holidays::table
        .filter(holidays::company_id.eq(company_id))
        .order(holidays::holiday_date.asc())
        .select(Holiday::as_select())
        .load(conn)
}

pub fn add_holiday(
    conn: &mut SqliteConnection,
    company_id: i32,
    holiday_date: NaiveDate,
    description: &str,
) -> ApiResult<Holiday> {
    if description.trim().is_empty() {
        return Err(ApiError::validation("Holiday description is required."));
    }
    let inserted = diesel::insert_into(holidays::table)
        .values(&NewHoliday {
            company_id,
            holiday_date,
            description: description.trim().to_string(),
        })
        .on_conflict_do_nothing()
        .execute(conn)?;
    if inserted == 0 {
        return Err(ApiError::conflict("A holiday for this date already exists."));
    }
    Ok(holidays::table
        .filter(holidays::company_id.eq(company_id))
        .filter(holidays::holiday_date.eq(holiday_date))
        .select(Holiday::as_select())
        .first(conn)?)
}

pub fn delete_holiday(conn: &mut SqliteConnection, company_id: i32, holiday_id: i32) -> ApiResult<()> {
    let deleted = diesel::delete(
        holidays::table
            .filter(holidays::company_id.eq(company_id))
            .filter(holidays::id.eq(holiday_id)),
    )
    .execute(conn)?;
    if deleted == 0 {
        return Err(ApiError::not_found("Holiday not found."));
    }
    Ok(())
}

pub fn is_holiday(conn: &mut SqliteConnection, company_id: i32, date: NaiveDate) -> QueryResult<bool> {
    let count: i64 = holidays::table
        .filter(holidays::company_id.eq(company_id))
        .filter(holidays::holiday_date.eq(date))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

// Office timings

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OfficeTimings {
    pub start_time: String,
    pub end_time: String,
}

pub fn office_timings(conn: &mut SqliteConnection, company_id: i32) -> QueryResult<OfficeTimings> {
    Ok(OfficeTimings {
        start_time: get_setting(conn, company_id, OFFICE_START_KEY)?
            .unwrap_or_else(|| DEFAULT_OFFICE_START.to_string()),
        end_time: get_setting(conn, company_id, OFFICE_END_KEY)?
            .unwrap_or_else(|| DEFAULT_OFFICE_END.to_string()),
    })
}

/// Stores both times; missing values fall back to the defaults.
pub fn save_office_timings(
    conn: &mut SqliteConnection,
    company_id: i32,
    start_time: Option<&str>,
    end_time: Option<&str>,
) -> ApiResult<OfficeTimings> {
    let start = start_time.unwrap_or(DEFAULT_OFFICE_START).trim();
    let end = end_time.unwrap_or(DEFAULT_OFFICE_END).trim();
    let (Some(start_at), Some(end_at)) = (parse_office_time(start), parse_office_time(end)) else {
        return Err(ApiError::validation("Office times must be in HH:MM format."));
    };
    if end_at <= start_at {
        return Err(ApiError::validation("Office end time must be after the start time."));
    }
    conn.immediate_transaction(|conn| {
        put_setting(conn, company_id, OFFICE_START_KEY, start)?;
        put_setting(conn, company_id, OFFICE_END_KEY, end)?;
        Ok(OfficeTimings {
            start_time: start.to_string(),
            end_time: end.to_string(),
        })
    })
}

/// The configured office start, or 09:30 when unset or unparseable.
pub fn office_start(conn: &mut SqliteConnection, company_id: i32) -> QueryResult<NaiveTime> {
    Ok(get_setting(conn, company_id, OFFICE_START_KEY)?
        .as_deref()
        .and_then(parse_office_time)
        .unwrap_or_else(default_office_start))
}

// Timezone

pub fn company_timezone(conn: &mut SqliteConnection, company_id: i32, fallback: Tz) -> QueryResult<Tz> {
    let stored = get_setting(conn, company_id, TIMEZONE_KEY)?;
    Ok(resolve_timezone(stored.as_deref(), fallback))
}

/// Rejects identifiers that do not name a known zone.
pub fn save_timezone(conn: &mut SqliteConnection, company_id: i32, id: &str) -> ApiResult<Tz> {
    let tz = parse_timezone(id)
        .ok_or_else(|| ApiError::validation(format!("Unknown timezone '{}'.", id.trim())))?;
    put_setting(conn, company_id, TIMEZONE_KEY, tz.name())?;
    Ok(tz)
}

/// Wall-clock time for the company at the given UTC instant.
pub fn company_local_now(
    conn: &mut SqliteConnection,
    company_id: i32,
    now_utc: NaiveDateTime,
    fallback: Tz,
) -> QueryResult<NaiveDateTime> {
    Ok(to_local(now_utc, company_timezone(conn, company_id, fallback)?))
}
