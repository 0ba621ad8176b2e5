//! Grant principal: a user or a team.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The subject of a folder grant.
///
/// Stored as a pair of nullable columns with a check constraint; in Rust
/// the "exactly one of user/team" rule is a type-level invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum Principal {
    /// An individual user.
    User(Uuid),
    /// A team; the grant applies to every member.
    Team(Uuid),
}

impl Principal {
    /// The user ID, if this is a user principal.
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::User(id) => Some(*id),
            Self::Team(_) => None,
        }
    }

    /// The team ID, if this is a team principal.
    pub fn team_id(&self) -> Option<Uuid> {
        match self {
            Self::User(_) => None,
            Self::Team(id) => Some(*id),
        }
    }

    /// Whether a grant to this principal applies to the given user,
    /// given the teams the user belongs to.
    pub fn applies_to(&self, user_id: Uuid, team_ids: &[Uuid]) -> bool {
        match self {
            Self::User(id) => *id == user_id,
            Self::Team(id) => team_ids.contains(id),
        }
    }

    /// Return the principal kind as a lowercase string.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Team(_) => "team",
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Team(id) => write!(f, "team:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applies_to() {
        let user = Uuid::new_v4();
        let team = Uuid::new_v4();
        let other_team = Uuid::new_v4();

        assert!(Principal::User(user).applies_to(user, &[]));
        assert!(!Principal::User(user).applies_to(Uuid::new_v4(), &[]));
        assert!(Principal::Team(team).applies_to(user, &[other_team, team]));
        assert!(!Principal::Team(team).applies_to(user, &[other_team]));
    }

    #[test]
    fn test_serde_tagging() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(Principal::Team(id)).unwrap();
        assert_eq!(json["type"], "team");
        assert_eq!(json["id"], id.to_string());
    }
}
