//! Tenant sign-up and platform-wide company statistics.

use chrono::{Duration, NaiveDateTime};
use diesel::prelude::*;
use serde::Serialize;
use ts_rs::TS;

use crate::error::{ApiError, ApiResult};
use crate::identity::{EmploymentStatus, Role};
use crate::models::{Company, NewCompany, NewDesignation, NewUser, User};
use crate::orm::lower;
use crate::schema::{companies, designations, users};

/// Designations every new company starts with.
pub const DEFAULT_DESIGNATIONS: [(&str, Role); 4] = [
    ("Administrator", Role::Admin),
    ("HR Manager", Role::HrManager),
    ("Department Manager", Role::DepartmentManager),
    ("Employee", Role::Employee),
];

/// Derives the login code for a company name: lowercase, spaces become
/// dashes, apostrophes are dropped.
pub fn company_code_for(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(' ', "-")
        .replace('\'', "")
}

pub struct Registration {
    pub company_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Creates the company, its admin and the default designations atomically.
pub fn register_company(
    conn: &mut SqliteConnection,
    reg: Registration,
    now: NaiveDateTime,
) -> ApiResult<(Company, User)> {
    let code = company_code_for(&reg.company_name);
    if code.is_empty() {
        return Err(ApiError::validation("Company name is required."));
    }
    let email = reg.email.trim().to_string();

    conn.immediate_transaction(|conn| {
        let code_taken = companies::table
            .filter(companies::company_code.eq(&code))
            .count()
            .get_result::<i64>(conn)?
            > 0;
        if code_taken {
            return Err(ApiError::conflict("Company with this name already exists."));
        }

        let email_taken = users::table
            .filter(lower(users::email).eq(email.to_lowercase()))
            .count()
            .get_result::<i64>(conn)?
            > 0;
        if email_taken {
            return Err(ApiError::conflict("This email is already registered."));
        }

        diesel::insert_into(companies::table)
            .values(&NewCompany {
                company_code: code.clone(),
                name: reg.company_name.trim().to_string(),
                owner_email: email.clone(),
                created_at: now,
            })
            .execute(conn)?;
        let company = companies::table
            .filter(companies::company_code.eq(&code))
            .select(Company::as_select())
            .first(conn)?;

        let admin = NewUser {
            company_id: company.id,
            department_id: None,
            first_name: reg.first_name,
            last_name: reg.last_name,
            email,
            password_hash: reg.password_hash,
            role: Role::Admin.as_str().to_string(),
            designation: Some("Administrator".to_string()),
            phone: None,
            dob: None,
            gender: None,
            marital_status: None,
            current_address: None,
            permanent_address: None,
            emergency_contact_name: None,
            emergency_contact_relation: None,
            salary: None,
            join_date: Some(now.date()),
            pan_number: None,
            bank_account_number: None,
            bank_name: None,
            ifsc_code: None,
            employment_status: EmploymentStatus::Active.as_str().to_string(),
            created_at: now,
        };
        diesel::insert_into(users::table).values(&admin).execute(conn)?;
        let user = users::table
            .filter(users::company_id.eq(company.id))
            .select(User::as_select())
            .first(conn)?;

        let seeded: Vec<NewDesignation> = DEFAULT_DESIGNATIONS
            .iter()
            .map(|(title, role)| NewDesignation {
                company_id: company.id,
                title: title.to_string(),
                maps_to_role: role.as_str().to_string(),
            })
            .collect();
        diesel::insert_into(designations::table)
            .values(&seeded)
            .execute(conn)?;

        Ok((company, user))
    })
}

pub fn get_company_by_id(conn: &mut SqliteConnection, company_id: i32) -> QueryResult<Option<Company>> {
    companies::table
        .find(company_id)
        .select(Company::as_select())
        .first(conn)
        .optional()
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct CompanyStat {
    pub id: i32,
    pub name: String,
    pub company_code: String,
    pub owner_email: String,
    #[serde(with = "crate::timestamps")]
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    pub user_count: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct PlatformStats {
    pub total_companies: i64,
    pub total_users: i64,
    pub new_companies_last_30_days: i64,
    pub companies: Vec<CompanyStat>,
}

/// Platform totals for the super admin, newest companies first.
pub fn platform_stats(conn: &mut SqliteConnection, now: NaiveDateTime) -> QueryResult<PlatformStats> {
    let total_companies = companies::table.count().get_result(conn)?;
    let total_users = users::table.count().get_result(conn)?;
    let new_companies_last_30_days = companies::table
        .filter(companies::created_at.ge(now - Duration::days(30)))
        .count()
        .get_result(conn)?;

    let counts: Vec<(i32, i64)> = users::table
        .group_by(users::company_id)
        .select((users::company_id, diesel::dsl::count_star()))
        .load(conn)?;

    let companies = companies::table
        .order((companies::created_at.desc(), companies::id.desc()))
        .select(Company::as_select())
        .load(conn)?
        .into_iter()
        .map(|c| CompanyStat {
            user_count: counts
                .iter()
                .find(|(id, _)| *id == c.id)
                .map(|(_, n)| *n)
                .unwrap_or(0),
            id: c.id,
            name: c.name,
            company_code: c.company_code,
            owner_email: c.owner_email,
            created_at: c.created_at,
        })
        .collect();

    Ok(PlatformStats {
        total_companies,
        total_users,
        new_companies_last_30_days,
        companies,
    })
}
