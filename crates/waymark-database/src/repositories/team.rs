//! Team and membership repository implementation.
//!
//! Also provides the in-database [`MembershipLookup`] used by the access
//! resolver; deployments with an external directory substitute their own
//! implementation of the trait.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use waymark_core::error::{AppError, ErrorKind};
use waymark_core::result::AppResult;
use waymark_core::traits::MembershipLookup;
use waymark_entity::team::{CreateMembership, CreateTeam, Team, TeamMembership, TeamRole};

/// Repository for teams and team memberships.
#[derive(Debug, Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    /// Create a new team repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a team by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Team>> {
        sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find team", e))
    }

    /// List the teams a user owns or administers.
    pub async fn find_managed_by(&self, user_id: Uuid) -> AppResult<Vec<Team>> {
        sqlx::query_as::<_, Team>(
            "SELECT DISTINCT t.* FROM teams t \
             LEFT JOIN team_memberships m ON m.team_id = t.id \
             WHERE t.owner_id = $1 OR (m.user_id = $1 AND m.role = 'admin') \
             ORDER BY t.name ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list teams", e))
    }

    /// List every team (staff view).
    pub async fn find_all(&self) -> AppResult<Vec<Team>> {
        sqlx::query_as::<_, Team>("SELECT * FROM teams ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list teams", e))
    }

    /// Create a new team.
    pub async fn create(&self, data: &CreateTeam) -> AppResult<Team> {
        sqlx::query_as::<_, Team>(
            "INSERT INTO teams (name, owner_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(&data.name)
        .bind(data.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create team", e))
    }

    /// Delete a team (cascades to memberships and team grants).
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete team", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a membership by ID.
    pub async fn find_membership_by_id(&self, id: Uuid) -> AppResult<Option<TeamMembership>> {
        sqlx::query_as::<_, TeamMembership>("SELECT * FROM team_memberships WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find membership", e)
            })
    }

    /// List the memberships of a team.
    pub async fn find_memberships_for_team(&self, team_id: Uuid) -> AppResult<Vec<TeamMembership>> {
        sqlx::query_as::<_, TeamMembership>(
            "SELECT * FROM team_memberships WHERE team_id = $1 ORDER BY created_at ASC",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list memberships", e))
    }

    /// Add a user to a team.
    pub async fn create_membership(&self, data: &CreateMembership) -> AppResult<TeamMembership> {
        sqlx::query_as::<_, TeamMembership>(
            "INSERT INTO team_memberships (user_id, team_id, role) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(data.user_id)
        .bind(data.team_id)
        .bind(data.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err)
                if db_err.constraint() == Some("team_memberships_user_team_key") =>
            {
                AppError::conflict("User is already a member of this team")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create membership", e),
        })
    }

    /// Change the role of a membership.
    pub async fn update_membership_role(
        &self,
        id: Uuid,
        role: TeamRole,
    ) -> AppResult<TeamMembership> {
        sqlx::query_as::<_, TeamMembership>(
            "UPDATE team_memberships SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update membership", e))?
        .ok_or_else(|| AppError::not_found(format!("Membership {id} not found")))
    }

    /// Remove a membership.
    pub async fn delete_membership(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM team_memberships WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete membership", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MembershipLookup for TeamRepository {
    async fn memberships_of(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT team_id FROM team_memberships WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to look up memberships", e)
            })
    }

    async fn is_admin(&self, user_id: Uuid, team_id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM team_memberships \
                WHERE user_id = $1 AND team_id = $2 AND role = 'admin' \
             )",
        )
        .bind(user_id)
        .bind(team_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check admin membership", e)
        })
    }
}
