//! Folder grant management — share and unshare folders.
//!
//! Any writer of a folder (its owner included, via ownership's implicit
//! full access) may manage that folder's grants.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use waymark_auth::FolderAccessResolver;
use waymark_core::error::AppError;
use waymark_core::result::AppResult;
use waymark_database::repositories::folder::FolderRepository;
use waymark_database::repositories::grant::GrantRepository;
use waymark_database::repositories::team::TeamRepository;
use waymark_database::repositories::user::UserRepository;
use waymark_entity::folder::Folder;
use waymark_entity::grant::{CreateGrant, FolderGrant, GrantAccess, Principal};

use crate::context::RequestContext;

/// Manages folder grants.
#[derive(Debug, Clone)]
pub struct GrantService {
    /// Grant repository.
    grant_repo: Arc<GrantRepository>,
    /// Folder repository.
    folder_repo: Arc<FolderRepository>,
    /// User repository (principal validation).
    user_repo: Arc<UserRepository>,
    /// Team repository (principal validation).
    team_repo: Arc<TeamRepository>,
    /// Access resolver.
    resolver: Arc<FolderAccessResolver>,
}

/// Request to share a folder with a principal.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateGrantRequest {
    /// The folder to share.
    pub folder_id: Uuid,
    /// The user or team receiving access.
    pub principal: Principal,
    /// Granted access level.
    pub access: GrantAccess,
}

impl GrantService {
    /// Creates a new grant service.
    pub fn new(
        grant_repo: Arc<GrantRepository>,
        folder_repo: Arc<FolderRepository>,
        user_repo: Arc<UserRepository>,
        team_repo: Arc<TeamRepository>,
        resolver: Arc<FolderAccessResolver>,
    ) -> Self {
        Self {
            grant_repo,
            folder_repo,
            user_repo,
            team_repo,
            resolver,
        }
    }

    /// Lists the grants attached to a folder the caller can manage.
    pub async fn list_for_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<Vec<FolderGrant>> {
        let folder = self.writable_folder(ctx, folder_id).await?;
        self.grant_repo.find_for_folder(folder.id).await
    }

    /// Shares a folder with a user or team.
    pub async fn create_grant(
        &self,
        ctx: &RequestContext,
        req: CreateGrantRequest,
    ) -> AppResult<FolderGrant> {
        let folder = self.writable_folder(ctx, req.folder_id).await?;
        self.validate_principal(&req.principal).await?;

        let grant = self
            .grant_repo
            .create(&CreateGrant {
                folder_id: folder.id,
                principal: req.principal,
                access: req.access,
            })
            .await?;

        info!(
            user_id = ?ctx.user_id,
            folder_id = %folder.id,
            principal = %grant.principal,
            access = %grant.access,
            "Folder shared"
        );

        Ok(grant)
    }

    /// Changes the access level of an existing grant.
    pub async fn update_grant(
        &self,
        ctx: &RequestContext,
        grant_id: Uuid,
        access: GrantAccess,
    ) -> AppResult<FolderGrant> {
        let grant = self
            .grant_repo
            .find_by_id(grant_id)
            .await?
            .ok_or_else(|| AppError::not_found("Grant not found"))?;
        self.writable_folder(ctx, grant.folder_id).await?;

        let updated = self.grant_repo.update_access(grant.id, access).await?;

        info!(
            user_id = ?ctx.user_id,
            grant_id = %grant.id,
            access = %updated.access,
            "Grant updated"
        );

        Ok(updated)
    }

    /// Revokes a grant.
    pub async fn delete_grant(&self, ctx: &RequestContext, grant_id: Uuid) -> AppResult<()> {
        let grant = self
            .grant_repo
            .find_by_id(grant_id)
            .await?
            .ok_or_else(|| AppError::not_found("Grant not found"))?;
        self.writable_folder(ctx, grant.folder_id).await?;

        self.grant_repo.delete(grant.id).await?;

        info!(
            user_id = ?ctx.user_id,
            grant_id = %grant.id,
            folder_id = %grant.folder_id,
            "Grant revoked"
        );

        Ok(())
    }

    /// Fetches a folder and requires the caller to be able to manage its
    /// sharing.
    async fn writable_folder(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<Folder> {
        let folder = self
            .folder_repo
            .find_by_id(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;

        let access = self
            .resolver
            .resolve(ctx.user_id, ctx.is_staff, &folder)
            .await?;
        if !access.can_write {
            return Err(AppError::authorization(
                "No permission to modify folder sharing",
            ));
        }

        Ok(folder)
    }

    /// Rejects grants to principals that do not exist.
    async fn validate_principal(&self, principal: &Principal) -> AppResult<()> {
        match principal {
            Principal::User(user_id) => {
                self.user_repo
                    .find_by_id(*user_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("User not found"))?;
            }
            Principal::Team(team_id) => {
                self.team_repo
                    .find_by_id(*team_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Team not found"))?;
            }
        }
        Ok(())
    }
}
