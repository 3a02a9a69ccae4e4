//! Role model for platform access control.
//!
//! Every user holds at most one role at a time. The role relation in the
//! hosted database may contain multiple rows per user; the resolver collapses
//! them to a single value with override precedence, so by the time a `Role`
//! exists here it is already canonical. Absence of a role is expressed as
//! `Option<Role>::None` and never grants access on its own.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access tier attached to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform administrator; bypasses all role checks.
    Admin,
    /// Property manager; inherits user-level access.
    Manager,
    /// External service provider with extranet access.
    Provider,
    /// Tenant or owner with standard access.
    User,
}

impl Role {
    /// Returns true if this role has admin privileges.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true if this role satisfies a requirement for `required`.
    ///
    /// Admin satisfies everything; a manager additionally satisfies
    /// user-level requirements. There is no inheritance upward: a manager
    /// does not satisfy an admin requirement.
    #[must_use]
    pub fn satisfies(&self, required: Role) -> bool {
        *self == required
            || self.is_admin()
            || (*self == Self::Manager && required == Self::User)
    }

    /// Returns the landing page for this role after sign-in.
    #[must_use]
    pub fn landing_path(&self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Provider => "/extranet",
            Self::Manager | Self::User => "/home",
        }
    }

    /// Returns the canonical lowercase name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Provider => "provider",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a role name does not belong to the closed role set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    /// The value that failed to parse.
    pub value: String,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.value)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "provider" => Ok(Self::Provider),
            "user" => Ok(Self::User),
            other => Err(ParseRoleError {
                value: other.to_string(),
            }),
        }
    }
}
