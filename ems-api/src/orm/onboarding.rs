//! Per-employee onboarding checklists.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::error::{ApiError, ApiResult};
use crate::identity::Principal;
use crate::models::{ChecklistItem, ChecklistRow, ChecklistUpdate, OnboardingChecklist, User};
use crate::orm::user::require_in_company;
use crate::policy::{self, Ownership, can_edit_checklist, can_view};
use crate::schema::onboarding_checklists;

fn checklist_owner(conn: &mut SqliteConnection, company_id: i32, employee_id: i32) -> ApiResult<User> {
    require_in_company(conn, company_id, employee_id).map_err(|e| match e {
        ApiError::NotFound(_) => ApiError::not_found("Employee not found in your company."),
        other => other,
    })
}

fn decode(stored: &OnboardingChecklist) -> ApiResult<Vec<ChecklistItem>> {
    serde_json::from_str(&stored.items).map_err(|e| {
        ApiError::internal(format!("checklist {} holds unreadable items: {e}", stored.id))
    })
}

/// The employee's checklist, empty when none has been saved yet.
pub fn checklist_for(
    conn: &mut SqliteConnection,
    principal: &Principal,
    company_id: i32,
    employee_id: i32,
) -> ApiResult<Vec<ChecklistItem>> {
    let employee = checklist_owner(conn, company_id, employee_id)?;
    policy::require(
        can_view(principal, &Ownership::owned_by(employee.id, employee.department_id)),
        "You do not have permission to view this checklist.",
    )?;
    let stored = onboarding_checklists::table
        .filter(onboarding_checklists::company_id.eq(company_id))
        .filter(onboarding_checklists::user_id.eq(employee_id))
        .select(OnboardingChecklist::as_select())
        .first(conn)
        .optional()?;
    match stored {
        Some(stored) => decode(&stored),
        None => Ok(Vec::new()),
    }
}

/// Replaces the whole checklist, creating it on first save.
pub fn save_checklist(
    conn: &mut SqliteConnection,
    principal: &Principal,
    company_id: i32,
    update: ChecklistUpdate,
    now: NaiveDateTime,
) -> ApiResult<Vec<ChecklistItem>> {
    let tasks: Vec<ChecklistItem> = update
        .tasks
        .into_iter()
        .map(|item| ChecklistItem {
            text: item.text.trim().to_string(),
            completed: item.completed,
        })
        .collect();
    if tasks.iter().any(|item| item.text.is_empty()) {
        return Err(ApiError::validation("Every checklist item needs text."));
    }
    let items = serde_json::to_string(&tasks)
        .map_err(|e| ApiError::internal(format!("checklist encoding failed: {e}")))?;

    conn.immediate_transaction(|conn| {
        let employee = checklist_owner(conn, company_id, update.employee_id)?;
        policy::require(
            can_edit_checklist(principal, &Ownership::owned_by(employee.id, employee.department_id)),
            "You do not have permission to update this checklist.",
        )?;
        let row = ChecklistRow {
            company_id,
            user_id: employee.id,
            items,
            updated_at: now,
        };
        diesel::insert_into(onboarding_checklists::table)
            .values(&row)
            .on_conflict(onboarding_checklists::user_id)
            .do_update()
            .set(&row)
            .execute(conn)?;
        Ok(tasks)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DepartmentFields, EmployeeProfile};
    use crate::orm::department::create_department;
    use crate::orm::testing::{fixed_now, register_named_company, register_test_company, setup_test_db};
    use crate::orm::user::add_employee;

    fn item(text: &str, completed: bool) -> ChecklistItem {
        ChecklistItem {
            text: text.to_string(),
            completed,
        }
    }

    fn member(conn: &mut SqliteConnection, company_id: i32, email: &str, designation: &str, dept: Option<i32>) -> User {
        add_employee(
            conn,
            company_id,
            EmployeeProfile {
                first_name: "Test".to_string(),
                last_name: email.to_string(),
                email: email.to_string(),
                designation: Some(designation.to_string()),
                department_id: dept,
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
    fn unsaved_checklist_is_empty_and_saves_replace_it() {
        let mut conn = setup_test_db();
        let (company, admin) = register_test_company(&mut conn);
        let hr = admin.principal().unwrap();
        let eve = member(&mut conn, company.id, "eve@acme.test", "Employee", None);

        assert!(checklist_for(&mut conn, &hr, company.id, eve.id).unwrap().is_empty());

        let first = ChecklistUpdate {
            employee_id: eve.id,
            tasks: vec![item("  Sign contract ", false), item("Get laptop", false)],
        };
        save_checklist(&mut conn, &hr, company.id, first, fixed_now()).unwrap();
        let second = ChecklistUpdate {
            employee_id: eve.id,
            tasks: vec![item("Sign contract", true)],
        };
        save_checklist(&mut conn, &hr, company.id, second, fixed_now()).unwrap();

        let stored = checklist_for(&mut conn, &hr, company.id, eve.id).unwrap();
        assert_eq!(stored, vec![item("Sign contract", true)]);
        let rows: i64 = onboarding_checklists::table.count().get_result(&mut conn).unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn employee_edits_own_list_but_not_a_colleagues() {
        let mut conn = setup_test_db();
        let (company, _) = register_test_company(&mut conn);
        let eng = dept(&mut conn, company.id, "Engineering");
        let sales = dept(&mut conn, company.id, "Sales");
        let eve = member(&mut conn, company.id, "eve@acme.test", "Employee", Some(eng));
        let sam = member(&mut conn, company.id, "sam@acme.test", "Employee", Some(sales));
        let mona = member(&mut conn, company.id, "mona@acme.test", "Department Manager", Some(eng));
        let (eve_p, mona_p) = (eve.principal().unwrap(), mona.principal().unwrap());

        let own = ChecklistUpdate {
            employee_id: eve.id,
            tasks: vec![item("Read handbook", true)],
        };
        save_checklist(&mut conn, &eve_p, company.id, own, fixed_now()).unwrap();
        assert_eq!(checklist_for(&mut conn, &mona_p, company.id, eve.id).unwrap().len(), 1);

        let theirs = ChecklistUpdate {
            employee_id: sam.id,
            tasks: vec![item("Read handbook", true)],
        };
        assert!(matches!(
            save_checklist(&mut conn, &eve_p, company.id, theirs.clone(), fixed_now()),
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            save_checklist(&mut conn, &mona_p, company.id, theirs, fixed_now()),
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            checklist_for(&mut conn, &eve_p, company.id, sam.id),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn blank_items_and_foreign_employees_are_refused() {
        let mut conn = setup_test_db();
        let (company, admin) = register_test_company(&mut conn);
        let hr = admin.principal().unwrap();
        let (_, stranger) = register_named_company(&mut conn, "Globex", "g@globex.test");

        let blank = ChecklistUpdate {
            employee_id: admin.id,
            tasks: vec![item("   ", false)],
        };
        assert!(matches!(
            save_checklist(&mut conn, &hr, company.id, blank, fixed_now()),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            checklist_for(&mut conn, &hr, company.id, stranger.id),
            Err(ApiError::NotFound(_))
        ));
    }
}
