//! Daily attendance state machine.
//!
//! Per principal and tenant-local day a record moves
//! `NoRecord -> ClockedIn -> ClockedOut`. [`decide`] works out which
//! transition a `mark` call performs and whether its guards hold; the
//! repository then applies it atomically.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::error::ApiError;

pub const GRACE_MINUTES: i64 = 15;
pub const DEFAULT_OFFICE_START: &str = "09:30";
pub const DEFAULT_OFFICE_END: &str = "18:30";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Absent => "absent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayState {
    NoRecord,
    ClockedIn,
    ClockedOut,
}

impl DayState {
    /// State of a stored record given its two timestamps.
    pub fn from_record(clock_in: bool, clock_out: bool) -> Self {
        match (clock_in, clock_out) {
            (_, true) => DayState::ClockedOut,
            (true, false) => DayState::ClockedIn,
            (false, false) => DayState::NoRecord,
        }
    }
}

/// Facts about the tenant-local day, loaded before deciding.
#[derive(Debug, Clone, Copy)]
pub struct DayContext {
    pub state: DayState,
    pub is_holiday: bool,
    pub on_approved_leave: bool,
    pub office_start: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    ClockIn(AttendanceStatus),
    ClockOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MarkRejected {
    #[error("Cannot mark attendance. Today is a holiday.")]
    Holiday,
    #[error("Cannot mark attendance. You are on an approved leave.")]
    OnLeave,
    #[error("You have already clocked in today.")]
    AlreadyClockedIn,
    #[error("You have already clocked out for today.")]
    AlreadyClockedOut,
}

impl From<MarkRejected> for ApiError {
    fn from(rejected: MarkRejected) -> Self {
        ApiError::conflict(rejected.to_string())
    }
}

/// Latest local time still counted as on time. A start within the grace
/// period of midnight clamps to 23:59:59.999, so with such a start every
/// clock-in that day, including one at 00:01, counts as present.
pub fn grace_threshold(office_start: NaiveTime) -> NaiveTime {
    let (threshold, wrapped) = office_start.overflowing_add_signed(Duration::minutes(GRACE_MINUTES));
    if wrapped != 0 {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(office_start)
    } else {
        threshold
    }
}

pub fn status_for(local_time: NaiveTime, office_start: NaiveTime) -> AttendanceStatus {
    if local_time > grace_threshold(office_start) {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    }
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_office_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

pub fn default_office_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 30, 0).unwrap_or(NaiveTime::MIN)
}

pub fn decide(ctx: &DayContext, local_time: NaiveTime) -> Result<Transition, MarkRejected> {
    match ctx.state {
        DayState::NoRecord => {
            if ctx.is_holiday {
                return Err(MarkRejected::Holiday);
            }
            if ctx.on_approved_leave {
                return Err(MarkRejected::OnLeave);
            }
            Ok(Transition::ClockIn(status_for(local_time, ctx.office_start)))
        }
        DayState::ClockedIn => Ok(Transition::ClockOut),
        DayState::ClockedOut => Err(MarkRejected::AlreadyClockedOut),
    }
}
