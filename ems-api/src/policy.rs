//! Authorization and visibility policy.
//!
//! Every decision about who may see or change which rows lives here. The
//! functions are pure: callers load whatever facts are needed (the target
//! row's owner and that owner's department, the requester's department
//! members) and pass them in.
//!
//! | role               | visibility                                  |
//! |--------------------|---------------------------------------------|
//! | admin, hr_manager  | every row in the tenant                     |
//! | department_manager | rows owned by their department, plus self   |
//! | employee           | rows they own                               |
//!
//! A department manager without a department sees only their own rows.
//! Tenant isolation is not decided here: every repository query is already
//! filtered by company id, and a row outside the tenant is reported as not
//! found before policy is consulted.

use std::collections::BTreeSet;

use crate::error::{ApiError, ApiResult};
use crate::identity::{EmploymentStatus, Principal, Role};

/// Row filter for listing a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Every row in the requester's tenant.
    Tenant,
    /// Only rows whose owner id is in the set.
    Owners(BTreeSet<i32>),
}

impl Visibility {
    pub fn allows(&self, owner_id: i32) -> bool {
        match self {
            Visibility::Tenant => true,
            Visibility::Owners(ids) => ids.contains(&owner_id),
        }
    }

    /// Owner ids to filter by, or `None` when no filter applies.
    pub fn owner_ids(&self) -> Option<Vec<i32>> {
        match self {
            Visibility::Tenant => None,
            Visibility::Owners(ids) => Some(ids.iter().copied().collect()),
        }
    }
}

/// Who owns a single row, as far as policy is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    /// requestor / assignee / raiser / employee id.
    pub owner_id: i32,
    /// Department of the owner at decision time.
    pub owner_department_id: Option<i32>,
    /// Assigner or setter, for resources that record one.
    pub created_by: Option<i32>,
}

impl Ownership {
    pub fn owned_by(owner_id: i32, owner_department_id: Option<i32>) -> Self {
        Self {
            owner_id,
            owner_department_id,
            created_by: None,
        }
    }

    pub fn created_by(mut self, creator: i32) -> Self {
        self.created_by = Some(creator);
        self
    }
}

/// The ids a department manager can see: their department's members and
/// themselves. Without a department this is just themselves.
pub fn team_ids(principal: &Principal, department_members: &[i32]) -> BTreeSet<i32> {
    let mut ids = BTreeSet::from([principal.id]);
    if principal.department_id.is_some() {
        ids.extend(department_members.iter().copied());
    }
    ids
}

/// Row filter for "list everything I may see".
///
/// `department_members` must hold the ids of the principals sharing the
/// requester's department; it is ignored for every role but
/// department_manager.
pub fn visibility(principal: &Principal, department_members: &[i32]) -> Visibility {
    match principal.role {
        Role::Admin | Role::HrManager => Visibility::Tenant,
        Role::DepartmentManager => Visibility::Owners(team_ids(principal, department_members)),
        Role::Employee => Visibility::Owners(BTreeSet::from([principal.id])),
        Role::SuperAdmin => Visibility::Owners(BTreeSet::new()),
    }
}

fn same_department(principal: &Principal, target: &Ownership) -> bool {
    matches!(
        (principal.department_id, target.owner_department_id),
        (Some(mine), Some(theirs)) if mine == theirs
    )
}

/// May the principal read this row?
pub fn can_view(principal: &Principal, target: &Ownership) -> bool {
    match principal.role {
        Role::Admin | Role::HrManager => true,
        Role::DepartmentManager => {
            target.owner_id == principal.id || same_department(principal, target)
        }
        Role::Employee => target.owner_id == principal.id,
        Role::SuperAdmin => false,
    }
}

/// May the principal act on this row on behalf of its owner (approve a
/// leave, set a goal for them, assign them a task)?
pub fn can_manage(principal: &Principal, target: &Ownership) -> bool {
    match principal.role {
        Role::Admin | Role::HrManager => true,
        Role::DepartmentManager => same_department(principal, target),
        Role::Employee | Role::SuperAdmin => false,
    }
}

/// May the principal edit or delete a row they are not the owner of, given
/// who created it? Department managers are limited to what they created.
pub fn can_edit_created(principal: &Principal, target: &Ownership) -> bool {
    match principal.role {
        Role::Admin | Role::HrManager => true,
        Role::DepartmentManager => target.created_by == Some(principal.id),
        Role::Employee | Role::SuperAdmin => false,
    }
}

/// Onboarding checklists are worked through by the employee together with
/// their manager and HR, so anyone who may view one may also edit it.
pub fn can_edit_checklist(principal: &Principal, target: &Ownership) -> bool {
    can_view(principal, target)
}

/// Only the owner may act, whatever their role (task status, goal status).
pub fn is_owner(principal: &Principal, target: &Ownership) -> bool {
    target.owner_id == principal.id
}

/// Documents are visible to HR across the tenant; everyone else sees their
/// own plus documents not tied to any employee.
pub fn can_view_document(principal: &Principal, employee_id: Option<i32>) -> bool {
    principal.role.is_hr_level() || employee_id.is_none_or(|id| id == principal.id)
}

/// Which employee an upload is filed under. Only HR may file for others.
pub fn document_owner(principal: &Principal, requested: Option<i32>) -> Option<i32> {
    if principal.role.is_hr_level() {
        requested
    } else {
        Some(principal.id)
    }
}

pub fn require(allowed: bool, message: &str) -> ApiResult<()> {
    if allowed {
        Ok(())
    } else {
        Err(ApiError::forbidden(message))
    }
}

/// Roles an employee record may be created or promoted into. Company
/// admins exist only through registration.
pub fn check_grantable_role(role: Role) -> ApiResult<()> {
    if matches!(role, Role::Admin | Role::SuperAdmin) {
        return Err(ApiError::forbidden(
            "The administrator role cannot be granted to an employee.",
        ));
    }
    Ok(())
}

/// Role changes: nobody changes their own role, an admin's role never
/// changes, and neither admin nor super_admin can be granted this way.
pub fn check_role_change(
    actor: &Principal,
    target_id: i32,
    target_role: Role,
    new_role: Role,
) -> ApiResult<()> {
    if target_id == actor.id {
        return Err(ApiError::forbidden("You cannot change your own role."));
    }
    if target_role == Role::Admin {
        return Err(ApiError::forbidden(
            "Cannot change the role of an Administrator.",
        ));
    }
    check_grantable_role(new_role)?;
    if !actor.role.is_hr_level() {
        return Err(ApiError::forbidden("Only HR may change roles."));
    }
    Ok(())
}

/// Hard deletion is allowed only for inactive, non-admin principals other
/// than the actor.
pub fn check_deletion(
    actor: &Principal,
    target_id: i32,
    target_role: Role,
    target_status: EmploymentStatus,
) -> ApiResult<()> {
    if target_id == actor.id {
        return Err(ApiError::forbidden("You cannot delete your own account."));
    }
    if target_role == Role::Admin {
        return Err(ApiError::forbidden("An Administrator cannot be deleted."));
    }
    if target_status == EmploymentStatus::Active {
        return Err(ApiError::validation(
            "Cannot delete an active employee. Please change their status to inactive first.",
        ));
    }
    Ok(())
}
