//! Team and membership management.
//!
//! A team's owner and its admin members manage membership; staff may
//! manage any team.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use waymark_auth::TeamAuthorizer;
use waymark_core::error::AppError;
use waymark_core::result::AppResult;
use waymark_database::repositories::team::TeamRepository;
use waymark_database::repositories::user::UserRepository;
use waymark_entity::team::{CreateMembership, CreateTeam, Team, TeamMembership, TeamRole};

use crate::context::RequestContext;

/// Manages teams and team memberships.
#[derive(Debug, Clone)]
pub struct TeamService {
    /// Team repository.
    team_repo: Arc<TeamRepository>,
    /// User repository (member validation).
    user_repo: Arc<UserRepository>,
    /// Team management authorizer.
    authorizer: Arc<TeamAuthorizer>,
}

/// Request to add a user to a team.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AddMemberRequest {
    /// The user to add.
    pub user_id: Uuid,
    /// Membership role.
    pub role: TeamRole,
}

impl TeamService {
    /// Creates a new team service.
    pub fn new(
        team_repo: Arc<TeamRepository>,
        user_repo: Arc<UserRepository>,
        authorizer: Arc<TeamAuthorizer>,
    ) -> Self {
        Self {
            team_repo,
            user_repo,
            authorizer,
        }
    }

    /// Lists the teams the caller may manage (staff see every team).
    pub async fn list_teams(&self, ctx: &RequestContext) -> AppResult<Vec<Team>> {
        let Some(user_id) = ctx.user_id else {
            return Ok(Vec::new());
        };
        if ctx.is_staff {
            return self.team_repo.find_all().await;
        }
        self.team_repo.find_managed_by(user_id).await
    }

    /// Creates a new team owned by the caller.
    pub async fn create_team(&self, ctx: &RequestContext, name: String) -> AppResult<Team> {
        let user_id = ctx.require_user()?;

        if name.trim().is_empty() {
            return Err(AppError::validation("Team name cannot be empty"));
        }

        let team = self
            .team_repo
            .create(&CreateTeam {
                name,
                owner_id: user_id,
            })
            .await?;

        info!(user_id = %user_id, team_id = %team.id, name = %team.name, "Team created");

        Ok(team)
    }

    /// Deletes a team (cascades to memberships and team grants).
    pub async fn delete_team(&self, ctx: &RequestContext, team_id: Uuid) -> AppResult<()> {
        let team = self.managed_team(ctx, team_id).await?;
        self.team_repo.delete(team.id).await?;

        info!(user_id = ?ctx.user_id, team_id = %team.id, "Team deleted");

        Ok(())
    }

    /// Lists a team's memberships.
    pub async fn list_members(
        &self,
        ctx: &RequestContext,
        team_id: Uuid,
    ) -> AppResult<Vec<TeamMembership>> {
        let team = self.managed_team(ctx, team_id).await?;
        self.team_repo.find_memberships_for_team(team.id).await
    }

    /// Adds a user to a team.
    pub async fn add_member(
        &self,
        ctx: &RequestContext,
        team_id: Uuid,
        req: AddMemberRequest,
    ) -> AppResult<TeamMembership> {
        let team = self.managed_team(ctx, team_id).await?;

        self.user_repo
            .find_by_id(req.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let membership = self
            .team_repo
            .create_membership(&CreateMembership {
                user_id: req.user_id,
                team_id: team.id,
                role: req.role,
            })
            .await?;

        info!(
            user_id = ?ctx.user_id,
            team_id = %team.id,
            member_id = %req.user_id,
            role = %membership.role,
            "Team member added"
        );

        Ok(membership)
    }

    /// Changes a member's role.
    pub async fn update_member_role(
        &self,
        ctx: &RequestContext,
        membership_id: Uuid,
        role: TeamRole,
    ) -> AppResult<TeamMembership> {
        let membership = self
            .team_repo
            .find_membership_by_id(membership_id)
            .await?
            .ok_or_else(|| AppError::not_found("Membership not found"))?;
        self.managed_team(ctx, membership.team_id).await?;

        let updated = self
            .team_repo
            .update_membership_role(membership.id, role)
            .await?;

        info!(
            user_id = ?ctx.user_id,
            membership_id = %membership.id,
            role = %updated.role,
            "Membership role updated"
        );

        Ok(updated)
    }

    /// Removes a member from a team.
    pub async fn remove_member(&self, ctx: &RequestContext, membership_id: Uuid) -> AppResult<()> {
        let membership = self
            .team_repo
            .find_membership_by_id(membership_id)
            .await?
            .ok_or_else(|| AppError::not_found("Membership not found"))?;
        self.managed_team(ctx, membership.team_id).await?;

        self.team_repo.delete_membership(membership.id).await?;

        info!(
            user_id = ?ctx.user_id,
            membership_id = %membership.id,
            team_id = %membership.team_id,
            "Team member removed"
        );

        Ok(())
    }

    /// Fetches a team and requires management permission on it.
    async fn managed_team(&self, ctx: &RequestContext, team_id: Uuid) -> AppResult<Team> {
        let team = self
            .team_repo
            .find_by_id(team_id)
            .await?
            .ok_or_else(|| AppError::not_found("Team not found"))?;
        self.authorizer
            .require_manage(ctx.user_id, ctx.is_staff, &team)
            .await?;
        Ok(team)
    }
}
