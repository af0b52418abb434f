use diesel::prelude::*;

use crate::error::{ApiError, ApiResult};
use crate::models::{Department, DepartmentFields, DepartmentInput, DepartmentView};
use crate::schema::{departments, users};

pub const DEPARTMENT_NOT_FOUND: &str = "Department not found.";

pub fn list_departments(conn: &mut SqliteConnection, company_id: i32) -> QueryResult<Vec<DepartmentView>> {
    let rows = departments::table
        .filter(departments::company_id.eq(company_id))
        .order(departments::name.asc())
        .select(Department::as_select())
        .load(conn)?;

    let counts: Vec<(Option<i32>, i64)> = users::table
        .filter(users::company_id.eq(company_id))
        .filter(users::department_id.is_not_null())
        .group_by(users::department_id)
        .select((users::department_id, diesel::dsl::count_star()))
        .load(conn)?;

    let manager_ids: Vec<i32> = rows.iter().filter_map(|d| d.manager_id).collect();
    let managers = crate::orm::user::names_by_id(conn, &manager_ids)?;

    Ok(rows
        .into_iter()
        .map(|d| DepartmentView {
            employee_count: counts
                .iter()
                .find(|(id, _)| *id == Some(d.id))
                .map(|(_, n)| *n)
                .unwrap_or(0),
            manager_name: d
                .manager_id
                .map(|id| crate::orm::user::name_of(&managers, id))
                .filter(|name| !name.is_empty()),
            id: d.id,
            name: d.name,
            description: d.description,
            manager_id: d.manager_id,
            is_active: d.is_active,
        })
        .collect())
}

pub fn find_department(
    conn: &mut SqliteConnection,
    company_id: i32,
    department_id: i32,
) -> ApiResult<Department> {
    departments::table
        .filter(departments::company_id.eq(company_id))
        .filter(departments::id.eq(department_id))
        .select(Department::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found(DEPARTMENT_NOT_FOUND))
}

fn validate(
    conn: &mut SqliteConnection,
    input: &DepartmentInput,
    existing_id: Option<i32>,
) -> ApiResult<()> {
    if input.name.is_empty() {
        return Err(ApiError::validation("Department name is required."));
    }
    if input.name.chars().count() > 100 {
        return Err(ApiError::validation(
            "Department name cannot be longer than 100 characters.",
        ));
    }

    let mut same_name = departments::table
        .filter(departments::company_id.eq(input.company_id))
        .filter(departments::name.eq(&input.name))
        .select(departments::id)
        .into_boxed();
    if let Some(id) = existing_id {
        same_name = same_name.filter(departments::id.ne(id));
    }
    if same_name.first::<i32>(conn).optional()?.is_some() {
        return Err(ApiError::conflict(format!(
            "A department named '{}' already exists.",
            input.name
        )));
    }

    if let Some(manager_id) = input.manager_id {
        let in_company: i64 = users::table
            .filter(users::company_id.eq(input.company_id))
            .filter(users::id.eq(manager_id))
            .count()
            .get_result(conn)?;
        if in_company == 0 {
            return Err(ApiError::validation("Manager does not belong to this company."));
        }
    }
    Ok(())
}

pub fn create_department(
    conn: &mut SqliteConnection,
    company_id: i32,
    fields: DepartmentFields,
) -> ApiResult<Department> {
    let input = fields.into_input(company_id);
    conn.immediate_transaction(|conn| {
        validate(conn, &input, None)?;
        diesel::insert_into(departments::table)
            .values(&input)
            .execute(conn)?;
        let created = departments::table
            .filter(departments::company_id.eq(company_id))
            .filter(departments::name.eq(&input.name))
            .select(Department::as_select())
            .first(conn)?;
        Ok(created)
    })
}

pub fn update_department(
    conn: &mut SqliteConnection,
    company_id: i32,
    department_id: i32,
    fields: DepartmentFields,
) -> ApiResult<Department> {
    let input = fields.into_input(company_id);
    conn.immediate_transaction(|conn| {
        find_department(conn, company_id, department_id)?;
        validate(conn, &input, Some(department_id))?;
        diesel::update(departments::table.find(department_id))
            .set(&input)
            .execute(conn)?;
        find_department(conn, company_id, department_id)
    })
}

/// Deletes the department after detaching its members.
pub fn delete_department(
    conn: &mut SqliteConnection,
    company_id: i32,
    department_id: i32,
) -> ApiResult<()> {
    conn.immediate_transaction(|conn| {
        find_department(conn, company_id, department_id)?;
        diesel::update(
            users::table
                .filter(users::company_id.eq(company_id))
                .filter(users::department_id.eq(department_id)),
        )
        .set(users::department_id.eq(None::<i32>))
        .execute(conn)?;
        diesel::delete(departments::table.find(department_id)).execute(conn)?;
        Ok(())
    })
}

/// Department managed by `manager_id`, if any.
pub fn managed_by(
    conn: &mut SqliteConnection,
    company_id: i32,
    manager_id: i32,
) -> QueryResult<Option<Department>> {
    departments::table
        .filter(departments::company_id.eq(company_id))
        .filter(departments::manager_id.eq(manager_id))
        .select(Department::as_select())
        .first(conn)
        .optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::testing::{register_test_company, setup_test_db};

    fn company(conn: &mut SqliteConnection) -> (i32, i32) {
        let (company, admin) = register_test_company(conn);
        (company.id, admin.id)
    }

    fn fields(name: &str, manager_id: Option<i32>) -> DepartmentFields {
        DepartmentFields {
            name: name.to_string(),
            description: None,
            manager_id,
            is_active: true,
        }
    }

    #[test]
    fn zero_manager_means_none() {
        let mut conn = setup_test_db();
        let (company_id, _) = company(&mut conn);
        let dept = create_department(&mut conn, company_id, fields("Sales", Some(0))).unwrap();
        assert_eq!(dept.manager_id, None);
    }

    #[test]
    fn duplicate_name_is_a_conflict() {
        let mut conn = setup_test_db();
        let (company_id, _) = company(&mut conn);
        create_department(&mut conn, company_id, fields("Sales", None)).unwrap();
        match create_department(&mut conn, company_id, fields("Sales", None)) {
            Err(ApiError::Conflict(msg)) => assert_eq!(msg, "A department named 'Sales' already exists."),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn renaming_to_itself_is_allowed() {
        let mut conn = setup_test_db();
        let (company_id, admin_id) = company(&mut conn);
        let dept = create_department(&mut conn, company_id, fields("Sales", None)).unwrap();
        let updated =
            update_department(&mut conn, company_id, dept.id, fields("Sales", Some(admin_id))).unwrap();
        assert_eq!(updated.manager_id, Some(admin_id));
    }

    #[test]
    fn foreign_manager_is_rejected() {
        let mut conn = setup_test_db();
        let (company_id, _) = company(&mut conn);
        let err = create_department(&mut conn, company_id, fields("Ops", Some(999))).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn delete_detaches_members() {
        let mut conn = setup_test_db();
        let (company_id, admin_id) = company(&mut conn);
        let dept = create_department(&mut conn, company_id, fields("Sales", None)).unwrap();
        diesel::update(users::table.find(admin_id))
            .set(users::department_id.eq(dept.id))
            .execute(&mut conn)
            .unwrap();

        delete_department(&mut conn, company_id, dept.id).unwrap();
        let dept_of_admin: Option<i32> = users::table
            .find(admin_id)
            .select(users::department_id)
            .first(&mut conn)
            .unwrap();
        assert_eq!(dept_of_admin, None);
        assert!(list_departments(&mut conn, company_id).unwrap().is_empty());
    }
}
