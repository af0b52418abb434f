//! Read-only aggregates: dashboard counters, HR reports, the org chart and
//! the company calendar.

use chrono::{Duration, NaiveDate};
use diesel::dsl::{avg, count, count_star};
use diesel::prelude::*;
use serde::Serialize;
use ts_rs::TS;

use crate::attendance::AttendanceStatus;
use crate::identity::{EmploymentStatus, Principal, Role};
use crate::models::{LeaveStatus, TaskStatus};
use crate::schema::{attendance, departments, holidays, leave_requests, tasks, users};

const ATTENDED: [&str; 2] = ["present", "late"];

// Dashboard

/// Role-shaped counters. Only the fields for the requester's role are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_employees: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_departments: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_leaves: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub present_today: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_pending_leaves: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_present_today: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_pending_leaves: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_tasks_pending: Option<i64>,
}

/// `today` is the company-local date.
pub fn dashboard_stats(
    conn: &mut SqliteConnection,
    principal: &Principal,
    company_id: i32,
    today: NaiveDate,
) -> QueryResult<DashboardStats> {
    let pending = LeaveStatus::Pending.as_str();
    match principal.role {
        Role::Admin | Role::HrManager => Ok(DashboardStats {
            total_employees: Some(
                users::table
                    .filter(users::company_id.eq(company_id))
                    .filter(users::role.ne(Role::Admin.as_str()))
                    .count()
                    .get_result(conn)?,
            ),
            total_departments: Some(
                departments::table
                    .filter(departments::company_id.eq(company_id))
                    .count()
                    .get_result(conn)?,
            ),
            pending_leaves: Some(
                leave_requests::table
                    .filter(leave_requests::company_id.eq(company_id))
                    .filter(leave_requests::status.eq(pending))
                    .count()
                    .get_result(conn)?,
            ),
            present_today: Some(
                attendance::table
                    .filter(attendance::company_id.eq(company_id))
                    .filter(attendance::date.eq(today))
                    .filter(attendance::status.eq_any(ATTENDED))
                    .count()
                    .get_result(conn)?,
            ),
            ..Default::default()
        }),
        Role::DepartmentManager => {
            let team: Vec<i32> = match principal.department_id {
                Some(department_id) => users::table
                    .filter(users::company_id.eq(company_id))
                    .filter(users::department_id.eq(department_id))
                    .filter(users::role.eq(Role::Employee.as_str()))
                    .select(users::id)
                    .load(conn)?,
                None => Vec::new(),
            };
            Ok(DashboardStats {
                team_count: Some(team.len() as i64),
                team_pending_leaves: Some(
                    leave_requests::table
                        .filter(leave_requests::requestor_id.eq_any(team.clone()))
                        .filter(leave_requests::status.eq(pending))
                        .count()
                        .get_result(conn)?,
                ),
                team_present_today: Some(
                    attendance::table
                        .filter(attendance::user_id.eq_any(team))
                        .filter(attendance::date.eq(today))
                        .filter(attendance::status.eq_any(ATTENDED))
                        .count()
                        .get_result(conn)?,
                ),
                ..Default::default()
            })
        }
        Role::Employee => Ok(DashboardStats {
            my_pending_leaves: Some(
                leave_requests::table
                    .filter(leave_requests::requestor_id.eq(principal.id))
                    .filter(leave_requests::status.eq(pending))
                    .count()
                    .get_result(conn)?,
            ),
            my_tasks_pending: Some(
                tasks::table
                    .filter(tasks::assigned_to_id.eq(principal.id))
                    .filter(tasks::status.ne(TaskStatus::Completed.as_str()))
                    .count()
                    .get_result(conn)?,
            ),
            ..Default::default()
        }),
        Role::SuperAdmin => Ok(DashboardStats::default()),
    }
}

// Reports

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ChartDataItem {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct AttendanceTrendItem {
    /// Short weekday name ("Mon").
    pub date: String,
    pub present: i64,
    pub late: i64,
    pub absent: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ReportSummary {
    pub headcount_data: Vec<ChartDataItem>,
    pub attendance_trend_data: Vec<AttendanceTrendItem>,
    pub leave_type_data: Vec<ChartDataItem>,
    pub salary_data: Vec<ChartDataItem>,
}

pub const TREND_DAYS: i64 = 7;

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Absence is never stored, so each day's absent count is the active
/// headcount minus everyone who clocked in.
pub fn attendance_trend(
    conn: &mut SqliteConnection,
    company_id: i32,
    today: NaiveDate,
) -> QueryResult<Vec<AttendanceTrendItem>> {
    let first_day = today - Duration::days(TREND_DAYS - 1);
    let headcount: i64 = users::table
        .filter(users::company_id.eq(company_id))
        .filter(users::employment_status.eq(EmploymentStatus::Active.as_str()))
        .count()
        .get_result(conn)?;
    let rows: Vec<(NaiveDate, String, i64)> = attendance::table
        .filter(attendance::company_id.eq(company_id))
        .filter(attendance::date.between(first_day, today))
        .group_by((attendance::date, attendance::status))
        .select((attendance::date, attendance::status, count_star()))
        .load(conn)?;

    let tally = |day: NaiveDate, status: AttendanceStatus| {
        rows.iter()
            .filter(|(d, s, _)| *d == day && s == status.as_str())
            .map(|(_, _, n)| *n)
            .sum::<i64>()
    };
    Ok((0..TREND_DAYS)
        .map(|offset| {
            let day = first_day + Duration::days(offset);
            let present = tally(day, AttendanceStatus::Present);
            let late = tally(day, AttendanceStatus::Late);
            AttendanceTrendItem {
                date: day.format("%a").to_string(),
                present,
                late,
                absent: (headcount - present - late).max(0),
            }
        })
        .collect())
}

pub fn report_summary(
    conn: &mut SqliteConnection,
    company_id: i32,
    today: NaiveDate,
) -> QueryResult<ReportSummary> {
    let headcount: Vec<(String, i64)> = users::table
        .inner_join(departments::table)
        .filter(users::company_id.eq(company_id))
        .group_by(departments::id)
        .select((departments::name, count(users::id)))
        .order(departments::name.asc())
        .load(conn)?;

    let leave_types: Vec<(String, i64)> = leave_requests::table
        .filter(leave_requests::company_id.eq(company_id))
        .filter(leave_requests::status.eq(LeaveStatus::Approved.as_str()))
        .group_by(leave_requests::leave_type)
        .select((leave_requests::leave_type, count_star()))
        .order(leave_requests::leave_type.asc())
        .load(conn)?;

    let salaries: Vec<(String, Option<f64>)> = users::table
        .inner_join(departments::table)
        .filter(users::company_id.eq(company_id))
        .filter(users::salary.is_not_null())
        .group_by(departments::id)
        .select((departments::name, avg(users::salary)))
        .order(departments::name.asc())
        .load(conn)?;

    let chart = |rows: Vec<(String, i64)>| {
        rows.into_iter()
            .map(|(name, n)| ChartDataItem { name, value: n as f64 })
            .collect::<Vec<_>>()
    };
    Ok(ReportSummary {
        headcount_data: chart(headcount),
        attendance_trend_data: attendance_trend(conn, company_id, today)?,
        leave_type_data: chart(leave_types),
        salary_data: salaries
            .into_iter()
            .map(|(name, average)| ChartDataItem {
                name,
                value: round2(average.unwrap_or(0.0)),
            })
            .collect(),
    })
}

// Org chart

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct OrgChartNode {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub children: Vec<OrgChartNode>,
}

/// Why a chart could not be built for a company that has principals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoAdmin;

type OrgRow = (i32, String, String, String, Option<i32>);

fn node((id, first_name, last_name, role, _): &OrgRow) -> OrgChartNode {
    OrgChartNode {
        id: *id,
        first_name: first_name.clone(),
        last_name: last_name.clone(),
        role: role.clone(),
        children: Vec::new(),
    }
}

/// Admin at the root; the first HR manager and every department manager
/// below it; employees under the manager of their department. `Ok(None)`
/// when the company has no active principals.
pub fn org_chart(conn: &mut SqliteConnection, company_id: i32) -> QueryResult<Result<Option<OrgChartNode>, NoAdmin>> {
    let rows: Vec<OrgRow> = users::table
        .filter(users::company_id.eq(company_id))
        .filter(users::employment_status.eq(EmploymentStatus::Active.as_str()))
        .order(users::id.asc())
        .select((
            users::id,
            users::first_name,
            users::last_name,
            users::role,
            users::department_id,
        ))
        .load(conn)?;
    if rows.is_empty() {
        return Ok(Ok(None));
    }
    let with_role = |role: Role| rows.iter().filter(move |r| r.3 == role.as_str());

    let Some(admin) = with_role(Role::Admin).next() else {
        return Ok(Err(NoAdmin));
    };
    let mut root = node(admin);
    if let Some(hr) = with_role(Role::HrManager).next() {
        root.children.push(node(hr));
    }
    for manager in with_role(Role::DepartmentManager) {
        let mut manager_node = node(manager);
        manager_node.children = with_role(Role::Employee)
            .filter(|e| manager.4.is_some() && e.4 == manager.4)
            .map(node)
            .collect();
        root.children.push(manager_node);
    }
    Ok(Ok(Some(root)))
}

// Calendar

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct CalendarEvent {
    /// `YYYY-MM-DD` for holidays, `MM-DD` for birthdays.
    pub date: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
}

pub fn calendar_events(conn: &mut SqliteConnection, company_id: i32) -> QueryResult<Vec<CalendarEvent>> {
    let holiday_rows: Vec<(NaiveDate, String)> = holidays::table
        .filter(holidays::company_id.eq(company_id))
        .order(holidays::holiday_date.asc())
        .select((holidays::holiday_date, holidays::description))
        .load(conn)?;
    let birthdays: Vec<(String, Option<NaiveDate>)> = users::table
        .filter(users::company_id.eq(company_id))
        .filter(users::dob.is_not_null())
        .order(users::id.asc())
        .select((users::first_name, users::dob))
        .load(conn)?;

    let mut events: Vec<CalendarEvent> = holiday_rows
        .into_iter()
        .map(|(date, description)| CalendarEvent {
            date: date.format("%Y-%m-%d").to_string(),
            description,
            kind: "holiday".to_string(),
        })
        .collect();
    events.extend(birthdays.into_iter().filter_map(|(first_name, dob)| {
        dob.map(|dob| CalendarEvent {
            date: dob.format("%m-%d").to_string(),
            description: format!("{first_name}'s B'day"),
            kind: "birthday".to_string(),
        })
    }));
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::DEFAULT_TIMEZONE;
    use crate::models::{DepartmentFields, EmployeeProfile, User};
    use crate::orm::attendance::{MarkLocation, mark};
    use crate::orm::department::create_department;
    use crate::orm::settings::add_holiday;
    use crate::orm::testing::{fixed_now, register_test_company, setup_test_db};
    use crate::orm::user::add_employee;

    fn person(conn: &mut SqliteConnection, company_id: i32, email: &str, designation: &str, dept: Option<i32>) -> User {
        add_employee(
            conn,
            company_id,
            EmployeeProfile {
                first_name: email.split('@').next().unwrap().to_string(),
                last_name: "T".to_string(),
                email: email.to_string(),
                designation: Some(designation.to_string()),
                department_id: dept,
                dob: NaiveDate::from_ymd_opt(1990, 7, 4),
                salary: Some(1000.0),
                ..Default::default()
            },
            "h".to_string(),
            fixed_now(),
        )
        .unwrap()
    }

    fn dept(conn: &mut SqliteConnection, company_id: i32, name: &str) -> i32 {
        create_department(
            conn,
            company_id,
            DepartmentFields {
                name: name.to_string(),
                description: None,
                manager_id: None,
                is_active: true,
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn org_chart_hangs_employees_under_their_manager() {
        let mut conn = setup_test_db();
        let (company, admin) = register_test_company(&mut conn);
        let eng = dept(&mut conn, company.id, "Engineering");
        person(&mut conn, company.id, "hr@acme.test", "HR Manager", None);
        let m = person(&mut conn, company.id, "m@acme.test", "Department Manager", Some(eng));
        let e = person(&mut conn, company.id, "e@acme.test", "Employee", Some(eng));
        person(&mut conn, company.id, "x@acme.test", "Employee", None);

        let root = org_chart(&mut conn, company.id).unwrap().unwrap().unwrap();
        assert_eq!(root.id, admin.id);
        assert_eq!(root.children.len(), 2);
        let manager_node = root.children.iter().find(|n| n.id == m.id).unwrap();
        assert_eq!(manager_node.children.iter().map(|n| n.id).collect::<Vec<_>>(), [e.id]);
    }

    #[test]
    fn org_chart_of_empty_company_is_none() {
        let mut conn = setup_test_db();
        assert_eq!(org_chart(&mut conn, 999).unwrap(), Ok(None));
    }

    #[test]
    fn dashboard_is_shaped_by_role() {
        let mut conn = setup_test_db();
        let (company, admin) = register_test_company(&mut conn);
        let eng = dept(&mut conn, company.id, "Engineering");
        let m = person(&mut conn, company.id, "m@acme.test", "Department Manager", Some(eng));
        let e = person(&mut conn, company.id, "e@acme.test", "Employee", Some(eng));
        mark(
            &mut conn,
            &e.principal().unwrap(),
            company.id,
            fixed_now(),
            DEFAULT_TIMEZONE,
            MarkLocation::default(),
        )
        .unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        let hr = dashboard_stats(&mut conn, &admin.principal().unwrap(), company.id, today).unwrap();
        assert_eq!(hr.total_employees, Some(2));
        assert_eq!(hr.total_departments, Some(1));
        assert_eq!(hr.present_today, Some(1));
        assert_eq!(hr.team_count, None);

        let team = dashboard_stats(&mut conn, &m.principal().unwrap(), company.id, today).unwrap();
        assert_eq!(team.team_count, Some(1));
        assert_eq!(team.team_present_today, Some(1));

        let mine = dashboard_stats(&mut conn, &e.principal().unwrap(), company.id, today).unwrap();
        assert_eq!(mine.my_pending_leaves, Some(0));
        assert_eq!(mine.total_employees, None);
    }

    #[test]
    fn trend_covers_seven_days_ending_today() {
        let mut conn = setup_test_db();
        let (company, admin) = register_test_company(&mut conn);
        mark(
            &mut conn,
            &admin.principal().unwrap(),
            company.id,
            fixed_now(),
            DEFAULT_TIMEZONE,
            MarkLocation::default(),
        )
        .unwrap();
        // 2025-03-10 is a Monday.
        let trend = attendance_trend(&mut conn, company.id, fixed_now().date()).unwrap();
        assert_eq!(trend.len(), 7);
        let last = trend.last().unwrap();
        assert_eq!(last.date, "Mon");
        assert_eq!((last.present, last.late, last.absent), (1, 0, 0));
        assert_eq!(trend[0].absent, 1);
    }

    #[test]
    fn summary_groups_by_department() {
        let mut conn = setup_test_db();
        let (company, _) = register_test_company(&mut conn);
        let eng = dept(&mut conn, company.id, "Engineering");
        person(&mut conn, company.id, "a@acme.test", "Employee", Some(eng));
        person(&mut conn, company.id, "b@acme.test", "Employee", Some(eng));
        let summary = report_summary(&mut conn, company.id, fixed_now().date()).unwrap();
        assert_eq!(
            summary.headcount_data,
            [ChartDataItem { name: "Engineering".to_string(), value: 2.0 }]
        );
        assert_eq!(summary.salary_data[0].value, 1000.0);
    }

    #[test]
    fn calendar_lists_holidays_and_birthdays() {
        let mut conn = setup_test_db();
        let (company, _) = register_test_company(&mut conn);
        add_holiday(&mut conn, company.id, NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(), "Independence Day")
            .unwrap();
        person(&mut conn, company.id, "bea@acme.test", "Employee", None);
        let events = calendar_events(&mut conn, company.id).unwrap();
        assert_eq!(events[0].date, "2025-08-15");
        assert_eq!(events[0].kind, "holiday");
        assert_eq!(events[1].date, "07-04");
        assert_eq!(events[1].description, "bea's B'day");
    }
}
