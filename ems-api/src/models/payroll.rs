use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::salary_structures;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = salary_structures)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct SalaryStructure {
    pub id: i32,
    pub company_id: i32,
    pub user_id: i32,
    pub basic: f64,
    pub hra: f64,
    pub allowances: f64,
    pub pf_deduction: f64,
    pub tax_deduction: f64,
}

#[derive(Insertable, AsChangeset, Debug, Clone, Copy)]
#[diesel(table_name = salary_structures)]
pub struct SalaryComponents {
    pub company_id: i32,
    pub user_id: i32,
    pub basic: f64,
    pub hra: f64,
    pub allowances: f64,
    pub pf_deduction: f64,
    pub tax_deduction: f64,
}

impl SalaryComponents {
    pub fn gross(&self) -> f64 {
        self.basic + self.hra + self.allowances
    }
}

/// Structure as exchanged with clients, with the derived gross salary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalaryStructureView {
    pub employee_id: i32,
    #[serde(default)]
    pub basic: f64,
    #[serde(default)]
    pub hra: f64,
    #[serde(default)]
    pub allowances: f64,
    #[serde(default)]
    pub pf_deduction: f64,
    #[serde(default)]
    pub tax_deduction: f64,
    #[serde(default)]
    pub gross_salary: f64,
}
