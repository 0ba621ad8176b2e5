//! Team membership role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role a user holds within a team.
///
/// Admins (and the team owner) may manage memberships and team-level
/// folder grants; members only confer the team's grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "team_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    /// Ordinary membership.
    Member,
    /// May manage the team's memberships.
    Admin,
}

impl TeamRole {
    /// Whether this role can manage the team.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TeamRole {
    type Err = waymark_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            _ => Err(waymark_core::AppError::validation(format!(
                "Invalid team role: '{s}'. Expected one of: member, admin"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("admin".parse::<TeamRole>().unwrap(), TeamRole::Admin);
        assert_eq!("MEMBER".parse::<TeamRole>().unwrap(), TeamRole::Member);
        assert!("owner".parse::<TeamRole>().is_err());
    }

    #[test]
    fn test_is_admin() {
        assert!(TeamRole::Admin.is_admin());
        assert!(!TeamRole::Member.is_admin());
    }
}
