//! Waypoint group CRUD, authorized through the owning activity.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use waymark_auth::ActivityAuthorizer;
use waymark_core::error::AppError;
use waymark_core::result::AppResult;
use waymark_core::traits::MediaStore;
use waymark_database::repositories::activity::ActivityRepository;
use waymark_database::repositories::group::WaypointGroupRepository;
use waymark_database::repositories::media::WaypointMediaRepository;
use waymark_entity::activity::Activity;
use waymark_entity::waypoint::{CreateWaypointGroup, WaypointGroup, WaypointGroupKind};

use crate::context::RequestContext;

/// Request to create a waypoint group.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateGroupRequest {
    /// The owning activity.
    pub activity_id: Uuid,
    /// Group name.
    pub name: Option<String>,
    /// Group kind.
    pub kind: WaypointGroupKind,
}

/// Request to update a waypoint group.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpdateGroupRequest {
    /// Group name.
    pub name: Option<String>,
    /// Group kind.
    pub kind: WaypointGroupKind,
}

/// Manages waypoint groups.
#[derive(Debug, Clone)]
pub struct WaypointGroupService {
    /// Group repository.
    group_repo: Arc<WaypointGroupRepository>,
    /// Activity repository.
    activity_repo: Arc<ActivityRepository>,
    /// Media repository (blob cleanup on delete).
    media_repo: Arc<WaypointMediaRepository>,
    /// Activity write authorizer.
    authorizer: Arc<ActivityAuthorizer>,
    /// Media blob store.
    media_store: Arc<dyn MediaStore>,
}

impl WaypointGroupService {
    /// Creates a new waypoint group service.
    pub fn new(
        group_repo: Arc<WaypointGroupRepository>,
        activity_repo: Arc<ActivityRepository>,
        media_repo: Arc<WaypointMediaRepository>,
        authorizer: Arc<ActivityAuthorizer>,
        media_store: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            group_repo,
            activity_repo,
            media_repo,
            authorizer,
            media_store,
        }
    }

    /// Lists the groups of an activity.
    pub async fn list_for_activity(
        &self,
        ctx: &RequestContext,
        activity_id: Uuid,
    ) -> AppResult<Vec<WaypointGroup>> {
        let activity = self
            .activity_repo
            .find_by_id(activity_id)
            .await?
            .ok_or_else(|| AppError::not_found("Activity not found"))?;
        if !self
            .authorizer
            .can_read(ctx.user_id, ctx.is_staff, &activity)
            .await?
        {
            return Err(AppError::not_found("Activity not found"));
        }
        self.group_repo.find_for_activity(activity.id).await
    }

    /// Creates a waypoint group.
    pub async fn create_group(
        &self,
        ctx: &RequestContext,
        req: CreateGroupRequest,
    ) -> AppResult<WaypointGroup> {
        let activity = self
            .activity_repo
            .find_by_id(req.activity_id)
            .await?
            .ok_or_else(|| AppError::not_found("Activity not found"))?;
        self.authorizer
            .require_write(ctx.user_id, ctx.is_staff, &activity)
            .await?;

        let group = self
            .group_repo
            .create(&CreateWaypointGroup {
                activity_id: activity.id,
                name: req.name,
                kind: req.kind,
            })
            .await?;

        info!(
            user_id = ?ctx.user_id,
            group_id = %group.id,
            activity_id = %activity.id,
            kind = %group.kind,
            "Waypoint group created"
        );

        Ok(group)
    }

    /// Renames or retypes a waypoint group.
    pub async fn update_group(
        &self,
        ctx: &RequestContext,
        group_id: Uuid,
        req: UpdateGroupRequest,
    ) -> AppResult<WaypointGroup> {
        let (group, activity) = self.group_with_activity(group_id).await?;
        self.authorizer
            .require_write(ctx.user_id, ctx.is_staff, &activity)
            .await?;

        let updated = self
            .group_repo
            .update(group.id, activity.id, req.name.as_deref(), req.kind)
            .await?;

        info!(
            user_id = ?ctx.user_id,
            group_id = %updated.id,
            "Waypoint group updated"
        );

        Ok(updated)
    }

    /// Deletes a waypoint group, its waypoints, and their media blobs.
    pub async fn delete_group(&self, ctx: &RequestContext, group_id: Uuid) -> AppResult<()> {
        let (group, activity) = self.group_with_activity(group_id).await?;
        self.authorizer
            .require_write(ctx.user_id, ctx.is_staff, &activity)
            .await?;

        let media_paths = self.media_repo.find_paths_for_group(group.id).await?;

        self.group_repo.delete(group.id, activity.id).await?;

        for path in media_paths {
            if let Err(e) = self.media_store.delete(&path).await {
                warn!(group_id = %group.id, path = %path, error = %e, "Failed to delete media blob");
            }
        }

        info!(
            user_id = ?ctx.user_id,
            group_id = %group.id,
            activity_id = %activity.id,
            "Waypoint group deleted"
        );

        Ok(())
    }

    /// Resolves a group together with its owning activity.
    async fn group_with_activity(&self, group_id: Uuid) -> AppResult<(WaypointGroup, Activity)> {
        let group = self
            .group_repo
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| AppError::not_found("Waypoint group not found"))?;
        let activity = self
            .activity_repo
            .find_by_id(group.activity_id)
            .await?
            .ok_or_else(|| AppError::not_found("Activity not found"))?;
        Ok((group, activity))
    }
}
