//! Team and membership entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::TeamRole;

/// A team of users that can be granted folder access collectively.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Team {
    /// Unique team identifier.
    pub id: Uuid,
    /// Team name.
    pub name: String,
    /// The user who owns (and implicitly manages) the team.
    pub owner_id: Uuid,
    /// When the team was created.
    pub created_at: DateTime<Utc>,
    /// When the team was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A user's membership in a team. Unique per (user, team) pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TeamMembership {
    /// Unique membership identifier.
    pub id: Uuid,
    /// The member.
    pub user_id: Uuid,
    /// The team.
    pub team_id: Uuid,
    /// Membership role.
    pub role: TeamRole,
    /// When the membership was created.
    pub created_at: DateTime<Utc>,
    /// When the membership was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeam {
    /// Team name.
    pub name: String,
    /// The owning user.
    pub owner_id: Uuid,
}

/// Data required to create a new membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    /// The member.
    pub user_id: Uuid,
    /// The team.
    pub team_id: Uuid,
    /// Membership role.
    pub role: TeamRole,
}
