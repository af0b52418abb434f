use chrono::{NaiveDate, NaiveDateTime};
use diesel::{AsChangeset, Associations, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::identity::{EmploymentStatus, Principal, Role};
use crate::schema::users;

/// A tenant principal with the full employee record.
#[derive(
    Queryable, Selectable, Identifiable, Associations, Debug, Clone, Serialize, Deserialize, TS,
)]
#[diesel(belongs_to(crate::models::company::Company))]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct User {
    pub id: i32,
    pub company_id: i32,
    pub department_id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub role: String,
    pub designation: Option<String>,
    pub phone: Option<String>,
    #[ts(type = "string | null")]
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_relation: Option<String>,
    pub salary: Option<f64>,
    #[ts(type = "string | null")]
    pub join_date: Option<NaiveDate>,
    pub pan_number: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_name: Option<String>,
    pub ifsc_code: Option<String>,
    pub employment_status: String,
    #[ts(type = "string | null")]
    pub last_working_day: Option<NaiveDate>,
    pub exit_reason: Option<String>,
    #[serde(with = "crate::timestamps")]
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

impl User {
    /// Stored role. Rows are constrained by a CHECK, so a parse failure means
    /// the row was written outside this service.
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }

    pub fn status(&self) -> Option<EmploymentStatus> {
        EmploymentStatus::parse(&self.employment_status)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn principal(&self) -> Option<Principal> {
        Some(Principal {
            id: self.id,
            email: self.email.clone(),
            role: self.role()?,
            company_id: Some(self.company_id),
            department_id: self.department_id,
        })
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub company_id: i32,
    pub department_id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub designation: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_relation: Option<String>,
    pub salary: Option<f64>,
    pub join_date: Option<NaiveDate>,
    pub pan_number: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_name: Option<String>,
    pub ifsc_code: Option<String>,
    pub employment_status: String,
    pub created_at: NaiveDateTime,
}

/// Fields HR may rewrite on an existing employee. Every field is written,
/// so `None` clears the column.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub struct EmployeeChanges {
    pub first_name: String,
    pub last_name: String,
    pub designation: Option<String>,
    pub department_id: Option<i32>,
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_relation: Option<String>,
    pub salary: Option<f64>,
    pub join_date: Option<NaiveDate>,
    pub pan_number: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_name: Option<String>,
    pub ifsc_code: Option<String>,
}

/// Fields a principal may change on their own record.
#[derive(AsChangeset, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
#[ts(export)]
pub struct ProfileChanges {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub current_address: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_relation: Option<String>,
}

/// Row shape for the employee directory.
#[derive(Queryable, Selectable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct EmployeeSummary {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub designation: Option<String>,
    pub department_id: Option<i32>,
    pub employment_status: String,
    pub salary: Option<f64>,
}

/// Employee fields as submitted by HR when adding, importing or editing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct EmployeeProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub designation: Option<String>,
    pub department_id: Option<i32>,
    pub phone: Option<String>,
    #[ts(type = "string | null")]
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_relation: Option<String>,
    pub salary: Option<f64>,
    #[ts(type = "string | null")]
    pub join_date: Option<NaiveDate>,
    pub pan_number: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_name: Option<String>,
    pub ifsc_code: Option<String>,
}

impl EmployeeProfile {
    pub fn into_new_user(
        self,
        company_id: i32,
        role: Role,
        password_hash: String,
        created_at: NaiveDateTime,
    ) -> NewUser {
        NewUser {
            company_id,
            department_id: self.department_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email.trim().to_string(),
            password_hash,
            role: role.as_str().to_string(),
            designation: self.designation,
            phone: self.phone,
            dob: self.dob,
            gender: self.gender,
            marital_status: self.marital_status,
            current_address: self.current_address,
            permanent_address: self.permanent_address,
            emergency_contact_name: self.emergency_contact_name,
            emergency_contact_relation: self.emergency_contact_relation,
            salary: self.salary,
            join_date: self.join_date,
            pan_number: self.pan_number,
            bank_account_number: self.bank_account_number,
            bank_name: self.bank_name,
            ifsc_code: self.ifsc_code,
            employment_status: EmploymentStatus::Active.as_str().to_string(),
            created_at,
        }
    }

    /// Everything but email, password and role, which have their own flows.
    pub fn into_changes(self) -> EmployeeChanges {
        EmployeeChanges {
            first_name: self.first_name,
            last_name: self.last_name,
            designation: self.designation,
            department_id: self.department_id,
            phone: self.phone,
            dob: self.dob,
            gender: self.gender,
            marital_status: self.marital_status,
            current_address: self.current_address,
            permanent_address: self.permanent_address,
            emergency_contact_name: self.emergency_contact_name,
            emergency_contact_relation: self.emergency_contact_relation,
            salary: self.salary,
            join_date: self.join_date,
            pan_number: self.pan_number,
            bank_account_number: self.bank_account_number,
            bank_name: self.bank_name,
            ifsc_code: self.ifsc_code,
        }
    }
}
