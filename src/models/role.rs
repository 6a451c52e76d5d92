//! Roles and their canonical names.
//!
//! Role rows are plain `(id, name)` pairs. Stored names are normalised before
//! use so that legacy spellings keep working without touching the data:
//! `staff` and `employees` both mean [`Role::Employee`].

use serde::Serialize;

/// A row in the `roles` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct RoleRecord {
    pub id: i64,
    pub name: String,
}

/// Canonical roles understood by route guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
    Accountant,
    Customer,
}

impl Role {
    /// Normalise a stored role name. Unknown names yield `None`, which no route accepts.
    pub fn from_name(name: &str) -> Option<Role> {
        match name.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "employee" | "staff" | "employees" => Some(Role::Employee),
            "accountant" => Some(Role::Accountant),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
            Role::Accountant => "accountant",
            Role::Customer => "customer",
        }
    }
}

/// Roles allowed on back-office ledger routes.
pub const FINANCE: &[Role] = &[Role::Admin, Role::Accountant];

/// Roles allowed on operations routes (customers, vehicles).
pub const OPERATIONS: &[Role] = &[Role::Admin, Role::Employee];

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_is_employee() {
        assert_eq!(Role::from_name("staff"), Some(Role::Employee));
        assert_eq!(Role::from_name(" Employees "), Some(Role::Employee));
        assert_eq!(Role::from_name("EMPLOYEE"), Some(Role::Employee));
    }

    #[test]
    fn test_known_roles() {
        assert_eq!(Role::from_name("admin"), Some(Role::Admin));
        assert_eq!(Role::from_name("Accountant"), Some(Role::Accountant));
        assert_eq!(Role::from_name("customer"), Some(Role::Customer));
    }

    #[test]
    fn test_unknown_role_is_none() {
        assert_eq!(Role::from_name(""), None);
        assert_eq!(Role::from_name("superuser"), None);
    }
}
