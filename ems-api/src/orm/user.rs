//! Employee records within a company.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rand::{Rng, distr::Alphanumeric};
use serde::Serialize;
use ts_rs::TS;

use crate::error::{ApiError, ApiResult};
use crate::identity::{EmploymentStatus, Principal, Role};
use crate::models::{Designation, EmployeeProfile, EmployeeSummary, NewUser, ProfileChanges, User};
use crate::orm::login::hash_password;
use crate::orm::lower;
use crate::policy::{self, Ownership, Visibility};
use crate::schema::{departments, designations, users};

pub const EMPLOYEE_NOT_FOUND: &str = "Employee not found.";

pub fn find_in_company(
    conn: &mut SqliteConnection,
    company_id: i32,
    user_id: i32,
) -> QueryResult<Option<User>> {
    users::table
        .filter(users::company_id.eq(company_id))
        .filter(users::id.eq(user_id))
        .select(User::as_select())
        .first(conn)
        .optional()
}

/// Like [`find_in_company`], but a missing row is a 404.
pub fn require_in_company(
    conn: &mut SqliteConnection,
    company_id: i32,
    user_id: i32,
) -> ApiResult<User> {
    find_in_company(conn, company_id, user_id)?.ok_or_else(|| ApiError::not_found(EMPLOYEE_NOT_FOUND))
}

/// Loads the policy facts for a row owned by `owner_id`.
pub fn ownership_of(
    conn: &mut SqliteConnection,
    company_id: i32,
    owner_id: i32,
) -> QueryResult<Ownership> {
    let department_id = users::table
        .filter(users::company_id.eq(company_id))
        .filter(users::id.eq(owner_id))
        .select(users::department_id)
        .first::<Option<i32>>(conn)
        .optional()?
        .flatten();
    Ok(Ownership::owned_by(owner_id, department_id))
}

pub fn department_member_ids(
    conn: &mut SqliteConnection,
    company_id: i32,
    department_id: i32,
) -> QueryResult<Vec<i32>> {
    users::table
        .filter(users::company_id.eq(company_id))
        .filter(users::department_id.eq(department_id))
        .select(users::id)
        .load(conn)
}

/// Row filter for the principal, loading department members only when the
/// policy needs them.
pub fn visibility_for(conn: &mut SqliteConnection, principal: &Principal) -> QueryResult<Visibility> {
    let members = match (principal.role, principal.company_id, principal.department_id) {
        (Role::DepartmentManager, Some(company_id), Some(department_id)) => {
            department_member_ids(conn, company_id, department_id)?
        }
        _ => Vec::new(),
    };
    Ok(policy::visibility(principal, &members))
}

/// The directory: every non-admin principal the requester may see.
pub fn list_employees(
    conn: &mut SqliteConnection,
    principal: &Principal,
    company_id: i32,
) -> QueryResult<Vec<EmployeeSummary>> {
    let visibility = visibility_for(conn, principal)?;
    let mut query = users::table
        .filter(users::company_id.eq(company_id))
        .filter(users::role.ne(Role::Admin.as_str()))
        .order(users::id.asc())
        .select(EmployeeSummary::as_select())
        .into_boxed();
    if let Some(ids) = visibility.owner_ids() {
        query = query.filter(users::id.eq_any(ids));
    }
    query.load(conn)
}

pub fn email_taken(conn: &mut SqliteConnection, company_id: i32, email: &str) -> QueryResult<bool> {
    let count: i64 = users::table
        .filter(users::company_id.eq(company_id))
        .filter(lower(users::email).eq(email.trim().to_lowercase()))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Role granted by a designation title, matched case-insensitively.
/// Unknown or missing titles give `employee`.
pub fn role_for_designation(designations: &[Designation], title: Option<&str>) -> Role {
    title
        .and_then(|t| {
            designations
                .iter()
                .find(|d| d.title.eq_ignore_ascii_case(t.trim()))
        })
        .and_then(|d| d.maps_to_role.parse().ok())
        .unwrap_or(Role::Employee)
}

fn company_designations(conn: &mut SqliteConnection, company_id: i32) -> QueryResult<Vec<Designation>> {
    designations::table
        .filter(designations::company_id.eq(company_id))
        .select(Designation::as_select())
        .load(conn)
}

fn check_department(
    conn: &mut SqliteConnection,
    company_id: i32,
    department_id: Option<i32>,
) -> ApiResult<()> {
    let Some(department_id) = department_id else {
        return Ok(());
    };
    let exists: i64 = departments::table
        .filter(departments::company_id.eq(company_id))
        .filter(departments::id.eq(department_id))
        .count()
        .get_result(conn)?;
    if exists == 0 {
        return Err(ApiError::validation("Department does not belong to this company."));
    }
    Ok(())
}

fn insert_user(conn: &mut SqliteConnection, new_user: &NewUser) -> QueryResult<User> {
    diesel::insert_into(users::table).values(new_user).execute(conn)?;
    users::table
        .filter(users::company_id.eq(new_user.company_id))
        .order(users::id.desc())
        .select(User::as_select())
        .first(conn)
}

pub fn add_employee(
    conn: &mut SqliteConnection,
    company_id: i32,
    profile: EmployeeProfile,
    password_hash: String,
    now: NaiveDateTime,
) -> ApiResult<User> {
    conn.immediate_transaction(|conn| {
        if email_taken(conn, company_id, &profile.email)? {
            return Err(ApiError::conflict(
                "An employee with this email already exists in the company.",
            ));
        }
        check_department(conn, company_id, profile.department_id)?;
        let role = role_for_designation(
            &company_designations(conn, company_id)?,
            profile.designation.as_deref(),
        );
        policy::check_grantable_role(role)?;
        let user = insert_user(conn, &profile.into_new_user(company_id, role, password_hash, now))?;
        Ok(user)
    })
}

#[derive(Debug, Clone)]
pub struct ImportRow {
    pub profile: EmployeeProfile,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct TemporaryCredential {
    pub email: String,
    pub temporary_password: String,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct BulkImportResult {
    pub message: String,
    pub imported: usize,
    pub skipped: usize,
    pub temporary_passwords: Vec<TemporaryCredential>,
}

/// A random password that satisfies the strength rules.
pub fn temporary_password() -> String {
    let mut rng = rand::rng();
    let body: String = (&mut rng)
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect();
    format!("Ems-{}{}", body, rng.random_range(10..100))
}

/// Inserts every row with a fresh email; blank and already-present emails,
/// including repeats within the batch, are skipped.
pub fn bulk_import(
    conn: &mut SqliteConnection,
    company_id: i32,
    rows: Vec<ImportRow>,
    now: NaiveDateTime,
) -> ApiResult<BulkImportResult> {
    conn.immediate_transaction(|conn| {
        let mut seen: Vec<String> = users::table
            .filter(users::company_id.eq(company_id))
            .select(lower(users::email))
            .load(conn)?;
        let designations = company_designations(conn, company_id)?;

        let mut imported = 0;
        let mut skipped = 0;
        let mut temporary_passwords = Vec::new();
        for row in rows {
            let email = row.profile.email.trim().to_lowercase();
            if email.is_empty() || seen.contains(&email) {
                skipped += 1;
                continue;
            }
            if check_department(conn, company_id, row.profile.department_id).is_err() {
                skipped += 1;
                continue;
            }
            let role = role_for_designation(&designations, row.profile.designation.as_deref());
            if policy::check_grantable_role(role).is_err() {
                warn!("Bulk import row '{}' skipped: designation grants {}", email, role);
                skipped += 1;
                continue;
            }
            let password = match row.password.filter(|p| !p.is_empty()) {
                Some(p) => p,
                None => {
                    let generated = temporary_password();
                    temporary_passwords.push(TemporaryCredential {
                        email: row.profile.email.trim().to_string(),
                        temporary_password: generated.clone(),
                    });
                    generated
                }
            };
            let new_user = row
                .profile
                .into_new_user(company_id, role, hash_password(&password)?, now);
            diesel::insert_into(users::table).values(&new_user).execute(conn)?;
            seen.push(email);
            imported += 1;
        }

        Ok(BulkImportResult {
            message: format!("{imported} employees imported successfully."),
            imported,
            skipped,
            temporary_passwords,
        })
    })
}

pub fn update_employee(
    conn: &mut SqliteConnection,
    company_id: i32,
    user_id: i32,
    profile: EmployeeProfile,
) -> ApiResult<()> {
    require_in_company(conn, company_id, user_id)?;
    check_department(conn, company_id, profile.department_id)?;
    diesel::update(users::table.filter(users::id.eq(user_id)))
        .set(&profile.into_changes())
        .execute(conn)?;
    Ok(())
}

pub fn update_profile(
    conn: &mut SqliteConnection,
    company_id: i32,
    user_id: i32,
    changes: &ProfileChanges,
) -> ApiResult<User> {
    require_in_company(conn, company_id, user_id)?;
    diesel::update(users::table.filter(users::id.eq(user_id)))
        .set(changes)
        .execute(conn)?;
    require_in_company(conn, company_id, user_id)
}

pub fn set_employment_status(
    conn: &mut SqliteConnection,
    company_id: i32,
    user_id: i32,
    status: EmploymentStatus,
    last_working_day: Option<NaiveDate>,
    exit_reason: Option<String>,
) -> ApiResult<()> {
    require_in_company(conn, company_id, user_id)?;
    diesel::update(users::table.filter(users::id.eq(user_id)))
        .set((
            users::employment_status.eq(status.as_str()),
            users::last_working_day.eq(last_working_day),
            users::exit_reason.eq(exit_reason),
        ))
        .execute(conn)?;
    Ok(())
}

/// Hard delete, allowed only for inactive non-admins other than the actor.
pub fn delete_employee(conn: &mut SqliteConnection, actor: &Principal, user_id: i32) -> ApiResult<()> {
    let company_id = actor
        .company_id
        .ok_or_else(|| ApiError::forbidden("A company account is required."))?;
    let target = require_in_company(conn, company_id, user_id)?;
    let role = target
        .role()
        .ok_or_else(|| ApiError::internal(format!("user {} has role '{}'", target.id, target.role)))?;
    let status = target.status().unwrap_or(EmploymentStatus::Active);
    policy::check_deletion(actor, target.id, role, status)?;

    conn.immediate_transaction(|conn| {
        diesel::update(departments::table.filter(departments::manager_id.eq(user_id)))
            .set(departments::manager_id.eq(None::<i32>))
            .execute(conn)?;
        diesel::delete(users::table.filter(users::id.eq(user_id))).execute(conn)?;
        Ok(())
    })
}

pub fn change_role(
    conn: &mut SqliteConnection,
    actor: &Principal,
    user_id: i32,
    new_role: Role,
) -> ApiResult<()> {
    let company_id = actor
        .company_id
        .ok_or_else(|| ApiError::forbidden("A company account is required."))?;
    let target = require_in_company(conn, company_id, user_id)?;
    let current = target
        .role()
        .ok_or_else(|| ApiError::internal(format!("user {} has role '{}'", target.id, target.role)))?;
    policy::check_role_change(actor, target.id, current, new_role)?;
    diesel::update(users::table.filter(users::id.eq(user_id)))
        .set(users::role.eq(new_role.as_str()))
        .execute(conn)?;
    Ok(())
}

/// `(id, "First Last")` for the given ids.
pub fn names_by_id(conn: &mut SqliteConnection, ids: &[i32]) -> QueryResult<Vec<(i32, String)>> {
    let rows: Vec<(i32, String, String)> = users::table
        .filter(users::id.eq_any(ids))
        .select((users::id, users::first_name, users::last_name))
        .load(conn)?;
    Ok(rows
        .into_iter()
        .map(|(id, first, last)| (id, format!("{first} {last}")))
        .collect())
}

pub fn name_of(names: &[(i32, String)], id: i32) -> String {
    names
        .iter()
        .find(|(candidate, _)| *candidate == id)
        .map(|(_, name)| name.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::login::is_strong_password;
    use crate::orm::testing::{fixed_now, register_test_company, setup_test_db};

    fn company(conn: &mut SqliteConnection) -> (i32, User) {
        let (company, admin) = register_test_company(conn);
        (company.id, admin)
    }

    fn profile(email: &str, designation: Option<&str>) -> EmployeeProfile {
        EmployeeProfile {
            first_name: "Eve".to_string(),
            last_name: "Employee".to_string(),
            email: email.to_string(),
            designation: designation.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn designation_decides_role() {
        let mut conn = setup_test_db();
        let (company_id, _) = company(&mut conn);
        let hr = add_employee(
            &mut conn,
            company_id,
            profile("hr@acme.test", Some("hr manager")),
            "h".to_string(),
            fixed_now(),
        )
        .unwrap();
        assert_eq!(hr.role, "hr_manager");

        let other = add_employee(
            &mut conn,
            company_id,
            profile("x@acme.test", Some("Astronaut")),
            "h".to_string(),
            fixed_now(),
        )
        .unwrap();
        assert_eq!(other.role, "employee");
    }

    #[test]
    fn administrator_designation_cannot_create_an_admin() {
        let mut conn = setup_test_db();
        let (company_id, _) = company(&mut conn);
        let err = add_employee(
            &mut conn,
            company_id,
            profile("boss@acme.test", Some("administrator")),
            "h".to_string(),
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let rows = vec![
            ImportRow { profile: profile("boss@acme.test", Some("Administrator")), password: None },
            ImportRow { profile: profile("eve@acme.test", Some("Employee")), password: None },
        ];
        let result = bulk_import(&mut conn, company_id, rows, fixed_now()).unwrap();
        assert_eq!((result.imported, result.skipped), (1, 1));

        let admins: i64 = users::table
            .filter(users::company_id.eq(company_id))
            .filter(users::role.eq("admin"))
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(admins, 1);
    }

    #[test]
    fn duplicate_email_in_company_is_a_conflict() {
        let mut conn = setup_test_db();
        let (company_id, _) = company(&mut conn);
        let err = add_employee(
            &mut conn,
            company_id,
            profile("ADA@acme.test", None),
            "h".to_string(),
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn bulk_import_skips_blank_and_repeated_emails() {
        let mut conn = setup_test_db();
        let (company_id, _) = company(&mut conn);
        let rows = vec![
            ImportRow { profile: profile("one@acme.test", None), password: Some("Str0ng!pw".to_string()) },
            ImportRow { profile: profile("", None), password: None },
            ImportRow { profile: profile("ONE@acme.test", None), password: None },
            ImportRow { profile: profile("ada@acme.test", None), password: None },
            ImportRow { profile: profile("two@acme.test", None), password: None },
        ];
        let result = bulk_import(&mut conn, company_id, rows, fixed_now()).unwrap();
        assert_eq!(result.imported, 2);
        assert_eq!(result.skipped, 3);
        assert_eq!(result.message, "2 employees imported successfully.");
        assert_eq!(result.temporary_passwords.len(), 1);
        assert_eq!(result.temporary_passwords[0].email, "two@acme.test");
    }

    #[test]
    fn temporary_passwords_are_strong() {
        for _ in 0..20 {
            assert!(is_strong_password(&temporary_password()));
        }
    }

    #[test]
    fn directory_hides_admins() {
        let mut conn = setup_test_db();
        let (company_id, admin) = company(&mut conn);
        add_employee(&mut conn, company_id, profile("e@acme.test", None), "h".to_string(), fixed_now())
            .unwrap();
        let principal = admin.principal().unwrap();
        let listed = list_employees(&mut conn, &principal, company_id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].email, "e@acme.test");
    }

    #[test]
    fn active_employee_cannot_be_deleted() {
        let mut conn = setup_test_db();
        let (company_id, admin) = company(&mut conn);
        let e = add_employee(&mut conn, company_id, profile("e@acme.test", None), "h".to_string(), fixed_now())
            .unwrap();
        let actor = admin.principal().unwrap();
        assert!(matches!(delete_employee(&mut conn, &actor, e.id), Err(ApiError::Validation(_))));

        set_employment_status(&mut conn, company_id, e.id, EmploymentStatus::Inactive, None, None).unwrap();
        delete_employee(&mut conn, &actor, e.id).unwrap();
        assert!(find_in_company(&mut conn, company_id, e.id).unwrap().is_none());
    }
}
