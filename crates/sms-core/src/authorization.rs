//! Role-based authorization rules.
//!
//! Every guarded handler names the [`Operation`] it performs and asks
//! [`is_authorized`] whether the caller's roles allow it. The table in
//! [`Operation::required_roles`] is the single source of truth for access
//! control; there is no per-route annotation.
//!
//! | Operation group                      | Allowed roles        |
//! |--------------------------------------|----------------------|
//! | Browse students and tickets, API     | any authenticated    |
//! | Student ticket create/delete         | any authenticated    |
//! | Create or delete a student           | admin                |
//! | Edit a student, close/create tickets | admin, manager       |
//! | Module enrollment management         | admin, manager       |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Roles carried in access token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Guest,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Guest => "guest",
        }
    }

    /// Parses every recognised role name, silently dropping unknown ones.
    pub fn parse_all<S: AsRef<str>>(names: &[S]) -> Vec<Role> {
        names
            .iter()
            .filter_map(|name| name.as_ref().parse().ok())
            .collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "guest" => Ok(Role::Guest),
            other => Err(format!("Invalid role: {}", other)),
        }
    }
}

/// Operations exposed by the HTTP surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    StudentList,
    StudentView,
    StudentCreate,
    StudentEdit,
    StudentDelete,
    StudentTicketCreate,
    StudentTicketDelete,
    ModuleMarkUpdate,
    ModuleEnroll,
    ModuleUnenroll,
    TicketSearch,
    TicketView,
    TicketClose,
    TicketCreate,
    TicketApiRead,
    TicketApiWrite,
}

const ANY_AUTHENTICATED: &[Role] = &[];
const ADMIN_ONLY: &[Role] = &[Role::Admin];
const STAFF: &[Role] = &[Role::Admin, Role::Manager];

impl Operation {
    /// Roles allowed to perform the operation. An empty slice means any
    /// authenticated caller may perform it.
    pub const fn required_roles(&self) -> &'static [Role] {
        match self {
            Operation::StudentList
            | Operation::StudentView
            | Operation::StudentTicketCreate
            | Operation::StudentTicketDelete
            | Operation::TicketSearch
            | Operation::TicketView
            | Operation::TicketApiRead => ANY_AUTHENTICATED,
            Operation::StudentCreate | Operation::StudentDelete => ADMIN_ONLY,
            Operation::StudentEdit
            | Operation::ModuleMarkUpdate
            | Operation::ModuleEnroll
            | Operation::ModuleUnenroll
            | Operation::TicketClose
            | Operation::TicketCreate
            | Operation::TicketApiWrite => STAFF,
        }
    }
}

/// Returns true when a caller holding `roles` may perform `operation`.
pub fn is_authorized(roles: &[Role], operation: Operation) -> bool {
    let required = operation.required_roles();
    required.is_empty() || roles.iter().any(|role| required.contains(role))
}
