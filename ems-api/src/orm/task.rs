use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::error::{ApiError, ApiResult};
use crate::identity::Principal;
use crate::models::{NewTask, Task, TaskChanges, TaskFields, TaskStatus, TaskView, User};
use crate::orm::notification;
use crate::orm::user::{name_of, names_by_id, require_in_company, visibility_for};
use crate::policy::{self, Ownership, can_edit_created, is_owner};
use crate::schema::tasks;

pub const TASK_NOT_FOUND: &str = "Task not found.";

fn find_task(conn: &mut SqliteConnection, company_id: i32, task_id: i32) -> ApiResult<Task> {
    tasks::table
        .filter(tasks::company_id.eq(company_id))
        .filter(tasks::id.eq(task_id))
        .select(Task::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found(TASK_NOT_FOUND))
}

fn with_names(conn: &mut SqliteConnection, tasks: Vec<Task>) -> QueryResult<Vec<TaskView>> {
    let mut ids: Vec<i32> = tasks
        .iter()
        .flat_map(|t| [t.assigned_to_id, t.assigned_by_id])
        .collect();
    ids.sort_unstable();
    ids.dedup();
    let names = names_by_id(conn, &ids)?;
    Ok(tasks
        .into_iter()
        .map(|task| TaskView {
            assigned_to_name: name_of(&names, task.assigned_to_id),
            assigned_by_name: name_of(&names, task.assigned_by_id),
            task,
        })
        .collect())
}

/// Tasks assigned to anyone the principal may see, soonest due first.
pub fn list_visible(
    conn: &mut SqliteConnection,
    principal: &Principal,
    company_id: i32,
) -> QueryResult<Vec<TaskView>> {
    let visibility = visibility_for(conn, principal)?;
    let mut query = tasks::table
        .filter(tasks::company_id.eq(company_id))
        .order((tasks::due_date.asc(), tasks::id.asc()))
        .select(Task::as_select())
        .into_boxed();
    if let Some(ids) = visibility.owner_ids() {
        query = query.filter(tasks::assigned_to_id.eq_any(ids));
    }
    let found = query.load(conn)?;
    with_names(conn, found)
}

/// The assignee must belong to the tenant, and to the team of a
/// department manager.
fn check_assignee(
    conn: &mut SqliteConnection,
    assigner: &Principal,
    company_id: i32,
    assignee_id: i32,
) -> ApiResult<User> {
    let assignee = require_in_company(conn, company_id, assignee_id)
        .map_err(|e| match e {
            ApiError::NotFound(_) => ApiError::not_found("Employee to assign task to was not found."),
            other => other,
        })?;
    let visibility = visibility_for(conn, assigner)?;
    policy::require(
        visibility.allows(assignee.id),
        "You can only assign tasks to members of your own department.",
    )?;
    Ok(assignee)
}

fn validate(fields: &TaskFields) -> ApiResult<()> {
    if fields.title.trim().is_empty() {
        return Err(ApiError::validation("Task title is required."));
    }
    Ok(())
}

pub fn create_task(
    conn: &mut SqliteConnection,
    assigner: &User,
    assigner_principal: &Principal,
    fields: TaskFields,
    now: NaiveDateTime,
) -> ApiResult<TaskView> {
    validate(&fields)?;
    let company_id = assigner.company_id;
    conn.immediate_transaction(|conn| {
        let assignee = check_assignee(conn, assigner_principal, company_id, fields.assigned_to_id)?;
        diesel::insert_into(tasks::table)
            .values(&NewTask {
                company_id,
                title: fields.title.trim().to_string(),
                description: fields.description,
                assigned_to_id: assignee.id,
                assigned_by_id: assigner.id,
                due_date: fields.due_date,
                priority: fields.priority,
                status: TaskStatus::Todo.as_str().to_string(),
            })
            .execute(conn)?;
        let task = tasks::table
            .filter(tasks::company_id.eq(company_id))
            .order(tasks::id.desc())
            .select(Task::as_select())
            .first(conn)?;
        notification::record(
            conn,
            company_id,
            format!(
                "{} assigned a new task to {}: '{}'.",
                assigner.first_name, assignee.first_name, task.title
            ),
            now,
        )?;
        Ok(with_names(conn, vec![task])?.remove(0))
    })
}

fn ownership(task: &Task) -> Ownership {
    Ownership::owned_by(task.assigned_to_id, None).created_by(task.assigned_by_id)
}

pub fn update_task(
    conn: &mut SqliteConnection,
    actor: &Principal,
    company_id: i32,
    task_id: i32,
    fields: TaskFields,
) -> ApiResult<TaskView> {
    validate(&fields)?;
    conn.immediate_transaction(|conn| {
        let task = find_task(conn, company_id, task_id)?;
        policy::require(
            can_edit_created(actor, &ownership(&task)),
            "You can only edit tasks that you have assigned.",
        )?;
        if fields.assigned_to_id != task.assigned_to_id {
            check_assignee(conn, actor, company_id, fields.assigned_to_id)?;
        }
        diesel::update(tasks::table.find(task.id))
            .set(&TaskChanges {
                title: fields.title.trim().to_string(),
                description: fields.description,
                assigned_to_id: fields.assigned_to_id,
                due_date: fields.due_date,
                priority: fields.priority,
            })
            .execute(conn)?;
        let task = find_task(conn, company_id, task.id)?;
        Ok(with_names(conn, vec![task])?.remove(0))
    })
}

pub fn delete_task(
    conn: &mut SqliteConnection,
    actor: &Principal,
    company_id: i32,
    task_id: i32,
    now: NaiveDateTime,
) -> ApiResult<()> {
    conn.immediate_transaction(|conn| {
        let task = find_task(conn, company_id, task_id)?;
        policy::require(
            can_edit_created(actor, &ownership(&task)),
            "You can only delete tasks that you have assigned.",
        )?;
        diesel::delete(tasks::table.find(task.id)).execute(conn)?;
        notification::record(conn, company_id, format!("A task '{}' was deleted.", task.title), now)?;
        Ok(())
    })
}

/// Only the assignee moves a task between states, whatever their role.
pub fn set_status(
    conn: &mut SqliteConnection,
    actor: &User,
    actor_principal: &Principal,
    task_id: i32,
    status: TaskStatus,
    now: NaiveDateTime,
) -> ApiResult<Task> {
    let company_id = actor.company_id;
    conn.immediate_transaction(|conn| {
        let task = find_task(conn, company_id, task_id)?;
        policy::require(
            is_owner(actor_principal, &ownership(&task)),
            "You can only update the status of tasks assigned to you.",
        )?;
        diesel::update(tasks::table.find(task.id))
            .set(tasks::status.eq(status.as_str()))
            .execute(conn)?;
        if status == TaskStatus::Completed {
            notification::record(
                conn,
                company_id,
                format!("{} completed the task: '{}'.", actor.full_name(), task.title),
                now,
            )?;
        }
        find_task(conn, company_id, task.id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DepartmentFields, EmployeeProfile};
    use crate::orm::department::create_department;
    use crate::orm::testing::{fixed_now, register_test_company, setup_test_db};
    use crate::orm::user::add_employee;
    use chrono::NaiveDate;

    struct Team {
        company_id: i32,
        manager: User,
        member: User,
        outsider: User,
        admin: User,
    }

    fn team(conn: &mut SqliteConnection) -> Team {
        let (company, admin) = register_test_company(conn);
        let mut dept = |name: &str| {
            create_department(
                conn,
                company.id,
                DepartmentFields {
                    name: name.to_string(),
                    description: None,
                    manager_id: None,
                    is_active: true,
                },
            )
            .unwrap()
            .id
        };
        let eng = dept("Engineering");
        let sales = dept("Sales");
        let mut person = |email: &str, designation: &str, department_id: i32| {
            add_employee(
                conn,
                company.id,
                EmployeeProfile {
                    first_name: email.split('@').next().unwrap().to_string(),
                    last_name: "Test".to_string(),
                    email: email.to_string(),
                    designation: Some(designation.to_string()),
                    department_id: Some(department_id),
                    ..Default::default()
                },
                "h".to_string(),
                fixed_now(),
            )
            .unwrap()
        };
        Team {
            company_id: company.id,
            manager: person("mia@acme.test", "Department Manager", eng),
            member: person("max@acme.test", "Employee", eng),
            outsider: person("sam@acme.test", "Employee", sales),
            admin,
        }
    }

    fn fields(assignee: i32) -> TaskFields {
        TaskFields {
            title: "Write report".to_string(),
            description: None,
            assigned_to_id: assignee,
            due_date: NaiveDate::from_ymd_opt(2025, 3, 20).unwrap(),
            priority: "high".to_string(),
        }
    }

    #[test]
    fn manager_assigns_only_inside_team() {
        let mut conn = setup_test_db();
        let t = team(&mut conn);
        let mp = t.manager.principal().unwrap();

        let view = create_task(&mut conn, &t.manager, &mp, fields(t.member.id), fixed_now()).unwrap();
        assert_eq!(view.assigned_to_name, "max Test");
        assert_eq!(view.task.status, "todo");

        let denied = create_task(&mut conn, &t.manager, &mp, fields(t.outsider.id), fixed_now());
        assert!(matches!(denied, Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn manager_cannot_edit_tasks_assigned_by_others() {
        let mut conn = setup_test_db();
        let t = team(&mut conn);
        let ap = t.admin.principal().unwrap();
        let by_admin = create_task(&mut conn, &t.admin, &ap, fields(t.member.id), fixed_now()).unwrap();

        let mp = t.manager.principal().unwrap();
        let result = update_task(&mut conn, &mp, t.company_id, by_admin.task.id, fields(t.member.id));
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
        let result = delete_task(&mut conn, &mp, t.company_id, by_admin.task.id, fixed_now());
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn only_assignee_changes_status() {
        let mut conn = setup_test_db();
        let t = team(&mut conn);
        let ap = t.admin.principal().unwrap();
        let view = create_task(&mut conn, &t.admin, &ap, fields(t.member.id), fixed_now()).unwrap();

        let denied = set_status(&mut conn, &t.admin, &ap, view.task.id, TaskStatus::Completed, fixed_now());
        assert!(matches!(denied, Err(ApiError::Forbidden(_))));

        let done = set_status(
            &mut conn,
            &t.member,
            &t.member.principal().unwrap(),
            view.task.id,
            TaskStatus::Completed,
            fixed_now(),
        )
        .unwrap();
        assert_eq!(done.status, "completed");
        let feed = notification::latest(&mut conn, t.company_id).unwrap();
        assert!(feed[0].message.contains("completed the task"));
    }

    #[test]
    fn employee_lists_only_own_tasks() {
        let mut conn = setup_test_db();
        let t = team(&mut conn);
        let ap = t.admin.principal().unwrap();
        create_task(&mut conn, &t.admin, &ap, fields(t.member.id), fixed_now()).unwrap();
        create_task(&mut conn, &t.admin, &ap, fields(t.outsider.id), fixed_now()).unwrap();

        let mine = list_visible(&mut conn, &t.member.principal().unwrap(), t.company_id).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].task.assigned_to_id, t.member.id);
        assert_eq!(list_visible(&mut conn, &ap, t.company_id).unwrap().len(), 2);
    }
}
