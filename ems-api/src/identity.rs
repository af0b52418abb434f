//! Roles and the authenticated principal.
//!
//! A [`Principal`] is built once per request by the auth guards and then
//! passed explicitly to every policy and repository call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    Admin,
    HrManager,
    DepartmentManager,
    Employee,
    SuperAdmin,
}

impl Role {
    pub const TENANT_ROLES: [Role; 4] = [
        Role::Admin,
        Role::HrManager,
        Role::DepartmentManager,
        Role::Employee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::HrManager => "hr_manager",
            Role::DepartmentManager => "department_manager",
            Role::Employee => "employee",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Full rights over the tenant (admin, hr_manager).
    pub fn is_hr_level(&self) -> bool {
        matches!(self, Role::Admin | Role::HrManager)
    }

    /// HR roles plus department managers.
    pub fn is_manager_level(&self) -> bool {
        self.is_hr_level() || *self == Role::DepartmentManager
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "hr_manager" => Ok(Role::HrManager),
            "department_manager" => Ok(Role::DepartmentManager),
            "employee" => Ok(Role::Employee),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum EmploymentStatus {
    Active,
    Inactive,
}

impl EmploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentStatus::Active => "active",
            EmploymentStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(EmploymentStatus::Active),
            "inactive" => Some(EmploymentStatus::Inactive),
            _ => None,
        }
    }
}

/// The acting user of a request.
///
/// `company_id` is `None` only for the super admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: i32,
    pub email: String,
    pub role: Role,
    pub company_id: Option<i32>,
    pub department_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_strings_round_trip() {
        for role in Role::TENANT_ROLES.iter().chain([Role::SuperAdmin].iter()) {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
        }
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn role_levels() {
        assert!(Role::Admin.is_hr_level());
        assert!(Role::HrManager.is_hr_level());
        assert!(!Role::DepartmentManager.is_hr_level());
        assert!(Role::DepartmentManager.is_manager_level());
        assert!(!Role::Employee.is_manager_level());
        assert!(!Role::SuperAdmin.is_manager_level());
    }

    #[test]
    fn role_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Role::HrManager).unwrap(), "\"hr_manager\"");
    }
}
