use diesel::prelude::*;

use crate::error::{ApiError, ApiResult};
use crate::models::{SalaryComponents, SalaryStructure, SalaryStructureView};
use crate::orm::user::require_in_company;
use crate::schema::{salary_structures, users};

fn check_employee(conn: &mut SqliteConnection, company_id: i32, employee_id: i32) -> ApiResult<crate::models::User> {
    require_in_company(conn, company_id, employee_id).map_err(|e| match e {
        ApiError::NotFound(_) => ApiError::not_found("Employee not found in your company."),
        other => other,
    })
}

/// The stored structure, or an all-zero one carrying the employee's current
/// salary as gross when none has been saved.
pub fn structure_for(
    conn: &mut SqliteConnection,
    company_id: i32,
    employee_id: i32,
) -> ApiResult<SalaryStructureView> {
    let employee = check_employee(conn, company_id, employee_id)?;
    let gross_salary = employee.salary.unwrap_or(0.0);
    let stored = salary_structures::table
        .filter(salary_structures::company_id.eq(company_id))
        .filter(salary_structures::user_id.eq(employee_id))
        .select(SalaryStructure::as_select())
        .first(conn)
        .optional()?;
    Ok(match stored {
        Some(s) => SalaryStructureView {
            employee_id,
            basic: s.basic,
            hra: s.hra,
            allowances: s.allowances,
            pf_deduction: s.pf_deduction,
            tax_deduction: s.tax_deduction,
            gross_salary,
        },
        None => SalaryStructureView {
            employee_id,
            basic: 0.0,
            hra: 0.0,
            allowances: 0.0,
            pf_deduction: 0.0,
            tax_deduction: 0.0,
            gross_salary,
        },
    })
}

/// Upserts the structure and sets the employee's salary to the gross.
pub fn save_structure(
    conn: &mut SqliteConnection,
    company_id: i32,
    input: SalaryStructureView,
) -> ApiResult<SalaryStructureView> {
    let components = SalaryComponents {
        company_id,
        user_id: input.employee_id,
        basic: input.basic,
        hra: input.hra,
        allowances: input.allowances,
        pf_deduction: input.pf_deduction,
        tax_deduction: input.tax_deduction,
    };
    let amounts = [
        components.basic,
        components.hra,
        components.allowances,
        components.pf_deduction,
        components.tax_deduction,
    ];
    if amounts.iter().any(|a| !a.is_finite() || *a < 0.0) {
        return Err(ApiError::validation("Salary amounts must be non-negative numbers."));
    }

    conn.immediate_transaction(|conn| {
        check_employee(conn, company_id, input.employee_id)?;
        diesel::insert_into(salary_structures::table)
            .values(&components)
            .on_conflict(salary_structures::user_id)
            .do_update()
            .set(&components)
            .execute(conn)?;
        let gross = components.gross();
        diesel::update(users::table.find(input.employee_id))
            .set(users::salary.eq(Some(gross)))
            .execute(conn)?;
        Ok(SalaryStructureView {
            gross_salary: gross,
            ..input
        })
    })
}
