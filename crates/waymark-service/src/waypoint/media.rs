//! Waypoint media management: rows in the store, blobs in the media
//! store, both owned by the waypoint.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use waymark_auth::ActivityAuthorizer;
use waymark_core::error::AppError;
use waymark_core::result::AppResult;
use waymark_core::traits::MediaStore;
use waymark_database::repositories::activity::ActivityRepository;
use waymark_database::repositories::group::WaypointGroupRepository;
use waymark_database::repositories::media::WaypointMediaRepository;
use waymark_database::repositories::waypoint::WaypointRepository;
use waymark_entity::activity::Activity;
use waymark_entity::waypoint::{CreateWaypointMedia, MediaKind, Waypoint, WaypointMedia};

use crate::context::RequestContext;

/// Request to attach media to a waypoint.
#[derive(Debug, Clone)]
pub struct AttachMediaRequest {
    /// The waypoint receiving the media.
    pub waypoint_id: Uuid,
    /// Media kind.
    pub kind: MediaKind,
    /// MIME type of the blob.
    pub mime_type: String,
    /// Alt text (images) or transcript (audio).
    pub description: Option<String>,
    /// Display order among the waypoint's media items.
    pub index: Option<i32>,
    /// File extension for the stored blob (e.g. `jpg`).
    pub file_extension: String,
    /// The blob contents.
    pub data: Bytes,
}

/// Manages waypoint media.
#[derive(Debug, Clone)]
pub struct WaypointMediaService {
    /// Media repository.
    media_repo: Arc<WaypointMediaRepository>,
    /// Waypoint repository.
    waypoint_repo: Arc<WaypointRepository>,
    /// Group repository.
    group_repo: Arc<WaypointGroupRepository>,
    /// Activity repository.
    activity_repo: Arc<ActivityRepository>,
    /// Activity write authorizer.
    authorizer: Arc<ActivityAuthorizer>,
    /// Media blob store.
    media_store: Arc<dyn MediaStore>,
}

impl WaypointMediaService {
    /// Creates a new waypoint media service.
    pub fn new(
        media_repo: Arc<WaypointMediaRepository>,
        waypoint_repo: Arc<WaypointRepository>,
        group_repo: Arc<WaypointGroupRepository>,
        activity_repo: Arc<ActivityRepository>,
        authorizer: Arc<ActivityAuthorizer>,
        media_store: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            media_repo,
            waypoint_repo,
            group_repo,
            activity_repo,
            authorizer,
            media_store,
        }
    }

    /// Lists the media attached to a waypoint.
    pub async fn list_for_waypoint(
        &self,
        ctx: &RequestContext,
        waypoint_id: Uuid,
    ) -> AppResult<Vec<WaypointMedia>> {
        let (waypoint, activity) = self.waypoint_with_activity(waypoint_id).await?;
        if !self
            .authorizer
            .can_read(ctx.user_id, ctx.is_staff, &activity)
            .await?
        {
            return Err(AppError::not_found("Waypoint not found"));
        }
        self.media_repo.find_for_waypoint(waypoint.id).await
    }

    /// Stores a blob and attaches it to a waypoint.
    pub async fn attach_media(
        &self,
        ctx: &RequestContext,
        req: AttachMediaRequest,
    ) -> AppResult<WaypointMedia> {
        let (waypoint, activity) = self.waypoint_with_activity(req.waypoint_id).await?;
        self.authorizer
            .require_write(ctx.user_id, ctx.is_staff, &activity)
            .await?;

        let media_path = format!(
            "{}/{}.{}",
            activity.media_directory_path(),
            Uuid::new_v4(),
            req.file_extension.trim_start_matches('.')
        );
        self.media_store.save(&media_path, req.data).await?;

        let created = self
            .media_repo
            .create(
                &CreateWaypointMedia {
                    waypoint_id: waypoint.id,
                    media_path: media_path.clone(),
                    kind: req.kind,
                    mime_type: req.mime_type,
                    description: req.description,
                    index: req.index,
                },
                activity.id,
            )
            .await;

        match created {
            Ok(media) => {
                info!(
                    user_id = ?ctx.user_id,
                    media_id = %media.id,
                    waypoint_id = %waypoint.id,
                    kind = %media.kind,
                    "Waypoint media attached"
                );
                Ok(media)
            }
            Err(e) => {
                // The row never landed; don't leave the blob orphaned.
                if let Err(cleanup) = self.media_store.delete(&media_path).await {
                    warn!(path = %media_path, error = %cleanup, "Failed to clean up media blob");
                }
                Err(e)
            }
        }
    }

    /// Updates a media row's description and display order.
    pub async fn update_media(
        &self,
        ctx: &RequestContext,
        media_id: Uuid,
        description: Option<String>,
        index: Option<i32>,
    ) -> AppResult<WaypointMedia> {
        let media = self
            .media_repo
            .find_by_id(media_id)
            .await?
            .ok_or_else(|| AppError::not_found("Waypoint media not found"))?;
        let (_, activity) = self.waypoint_with_activity(media.waypoint_id).await?;
        self.authorizer
            .require_write(ctx.user_id, ctx.is_staff, &activity)
            .await?;

        let updated = self
            .media_repo
            .update(media.id, activity.id, description.as_deref(), index)
            .await?;

        info!(
            user_id = ?ctx.user_id,
            media_id = %updated.id,
            "Waypoint media updated"
        );

        Ok(updated)
    }

    /// Deletes a media row and its stored blob.
    pub async fn delete_media(&self, ctx: &RequestContext, media_id: Uuid) -> AppResult<()> {
        let media = self
            .media_repo
            .find_by_id(media_id)
            .await?
            .ok_or_else(|| AppError::not_found("Waypoint media not found"))?;
        let (_, activity) = self.waypoint_with_activity(media.waypoint_id).await?;
        self.authorizer
            .require_write(ctx.user_id, ctx.is_staff, &activity)
            .await?;

        self.media_repo.delete(media.id, activity.id).await?;

        if let Err(e) = self.media_store.delete(&media.media_path).await {
            warn!(media_id = %media.id, path = %media.media_path, error = %e, "Failed to delete media blob");
        }

        info!(
            user_id = ?ctx.user_id,
            media_id = %media.id,
            waypoint_id = %media.waypoint_id,
            "Waypoint media deleted"
        );

        Ok(())
    }

    /// Resolves a waypoint together with its owning activity.
    async fn waypoint_with_activity(
        &self,
        waypoint_id: Uuid,
    ) -> AppResult<(Waypoint, Activity)> {
        let waypoint = self
            .waypoint_repo
            .find_by_id(waypoint_id)
            .await?
            .ok_or_else(|| AppError::not_found("Waypoint not found"))?;
        let group = self
            .group_repo
            .find_by_id(waypoint.group_id)
            .await?
            .ok_or_else(|| AppError::not_found("Waypoint group not found"))?;
        let activity = self
            .activity_repo
            .find_by_id(group.activity_id)
            .await?
            .ok_or_else(|| AppError::not_found("Activity not found"))?;
        Ok((waypoint, activity))
    }
}
