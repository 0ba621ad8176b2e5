//! Activity lifecycle — the write gateway for the activity aggregate.
//!
//! Every mutation authorizes before touching storage: folder write access
//! for filed activities, authorship for unfiled ones, staff always.
//! Mutations flag `unpublished_changes`; publishing is the only path that
//! clears it.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use waymark_auth::{ActivityAuthorizer, FolderAccessResolver};
use waymark_core::error::AppError;
use waymark_core::result::AppResult;
use waymark_core::traits::MediaStore;
use waymark_database::repositories::activity::{ActivityRepository, UpdateActivity};
use waymark_database::repositories::folder::FolderRepository;
use waymark_database::repositories::user::UserRepository;
use waymark_entity::activity::{Activity, ActivityKind, CreateActivity, DEFAULT_LOCALE};
use waymark_entity::waypoint::WaypointGroup;

use crate::context::RequestContext;

/// Name of the ordered route group created with every activity.
pub const DEFAULT_ROUTE_GROUP_NAME: &str = "Default";
/// Name of the unordered points-of-interest group created with every
/// activity.
pub const DEFAULT_POI_GROUP_NAME: &str = "Points of Interest";

/// Listing filter for activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ActivityFilter {
    /// Activities filed under a specific folder.
    Folder(Uuid),
    /// The caller's unfiled activities.
    Unfiled,
}

/// Request to create a new activity.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateActivityRequest {
    /// Activity title.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Activity kind.
    pub kind: ActivityKind,
    /// Content locale (defaults to `en_US`).
    pub locale: Option<String>,
    /// Availability window start.
    pub start_at: Option<chrono::DateTime<Utc>>,
    /// Availability window end.
    pub end_at: Option<chrono::DateTime<Utc>>,
    /// Whether the activity expires.
    pub expires: bool,
    /// Folder to file the activity under.
    pub folder_id: Option<Uuid>,
}

/// Manages the activity lifecycle.
#[derive(Debug, Clone)]
pub struct ActivityService {
    /// Activity repository.
    activity_repo: Arc<ActivityRepository>,
    /// Folder repository.
    folder_repo: Arc<FolderRepository>,
    /// User repository (author snapshots).
    user_repo: Arc<UserRepository>,
    /// Folder access resolver.
    resolver: Arc<FolderAccessResolver>,
    /// Activity write authorizer.
    authorizer: Arc<ActivityAuthorizer>,
    /// Media blob store.
    media_store: Arc<dyn MediaStore>,
}

impl ActivityService {
    /// Creates a new activity service.
    pub fn new(
        activity_repo: Arc<ActivityRepository>,
        folder_repo: Arc<FolderRepository>,
        user_repo: Arc<UserRepository>,
        resolver: Arc<FolderAccessResolver>,
        authorizer: Arc<ActivityAuthorizer>,
        media_store: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            activity_repo,
            folder_repo,
            user_repo,
            resolver,
            authorizer,
            media_store,
        }
    }

    /// Lists the activities visible to the caller, optionally scoped to
    /// one folder or to the caller's unfiled activities. An inaccessible
    /// folder filter yields an empty list rather than an error.
    pub async fn list_activities(
        &self,
        ctx: &RequestContext,
        filter: Option<ActivityFilter>,
    ) -> AppResult<Vec<Activity>> {
        let Some(user_id) = ctx.user_id else {
            return Ok(Vec::new());
        };

        match filter {
            Some(ActivityFilter::Unfiled) => {
                self.activity_repo.find_unfiled_by_author(user_id).await
            }
            Some(ActivityFilter::Folder(folder_id)) => {
                let accessible = self
                    .resolver
                    .accessible_folder_ids(ctx.user_id, ctx.is_staff)
                    .await?;
                if accessible.contains(&folder_id) {
                    self.activity_repo.find_by_folder(folder_id).await
                } else {
                    Ok(Vec::new())
                }
            }
            None => {
                let accessible = self
                    .resolver
                    .accessible_folder_ids(ctx.user_id, ctx.is_staff)
                    .await?;
                let folder_ids: Vec<Uuid> = accessible.into_iter().collect();
                self.activity_repo
                    .find_accessible(user_id, &folder_ids)
                    .await
            }
        }
    }

    /// Gets an activity by ID. Inaccessible activities are reported as
    /// missing.
    pub async fn get_activity(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Activity> {
        let activity = self
            .activity_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Activity not found"))?;

        if !self
            .authorizer
            .can_read(ctx.user_id, ctx.is_staff, &activity)
            .await?
        {
            return Err(AppError::not_found("Activity not found"));
        }

        Ok(activity)
    }

    /// Creates an activity together with its two default waypoint groups.
    /// The author is always the caller.
    pub async fn create_activity(
        &self,
        ctx: &RequestContext,
        req: CreateActivityRequest,
    ) -> AppResult<(Activity, Vec<WaypointGroup>)> {
        let user_id = ctx.require_user()?;

        if let Some(folder_id) = req.folder_id {
            let folder = self
                .folder_repo
                .find_by_id(folder_id)
                .await?
                .ok_or_else(|| AppError::not_found("Folder not found"))?;
            self.resolver
                .require_write(ctx.user_id, ctx.is_staff, &folder)
                .await?;
        }

        let author = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let (activity, groups) = self
            .activity_repo
            .create_with_default_groups(
                &CreateActivity {
                    author_id: author.id,
                    author_name: author.display_name.clone(),
                    author_email: author.email.clone(),
                    name: req.name,
                    description: req.description,
                    kind: req.kind,
                    locale: req.locale.unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
                    start_at: req.start_at,
                    end_at: req.end_at,
                    expires: req.expires,
                    folder_id: req.folder_id,
                },
                DEFAULT_ROUTE_GROUP_NAME,
                DEFAULT_POI_GROUP_NAME,
            )
            .await?;

        info!(
            user_id = %user_id,
            activity_id = %activity.id,
            name = %activity.name,
            "Activity created"
        );

        Ok((activity, groups))
    }

    /// Updates an activity. Requires write access on the current folder
    /// (when filed) and additionally on the destination folder when the
    /// update moves the activity.
    pub async fn update_activity(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        req: UpdateActivity,
    ) -> AppResult<Activity> {
        let activity = self.get_activity(ctx, id).await?;

        if let Some(folder_id) = activity.folder_id {
            let folder = self
                .folder_repo
                .find_by_id(folder_id)
                .await?
                .ok_or_else(|| AppError::not_found("Folder not found"))?;
            self.resolver
                .require_write(ctx.user_id, ctx.is_staff, &folder)
                .await?;
        }

        if req.folder_id != activity.folder_id {
            if let Some(destination_id) = req.folder_id {
                let destination = self
                    .folder_repo
                    .find_by_id(destination_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Folder not found"))?;
                self.resolver
                    .require_write(ctx.user_id, ctx.is_staff, &destination)
                    .await?;
            }
        }

        let updated = self.activity_repo.update(activity.id, &req).await?;

        info!(
            user_id = ?ctx.user_id,
            activity_id = %updated.id,
            "Activity updated"
        );

        Ok(updated)
    }

    /// Deletes an activity and every stored file under it.
    pub async fn delete_activity(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let activity = self.get_activity(ctx, id).await?;

        match activity.folder_id {
            Some(folder_id) => {
                let folder = self
                    .folder_repo
                    .find_by_id(folder_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Folder not found"))?;
                self.resolver
                    .require_write(ctx.user_id, ctx.is_staff, &folder)
                    .await?;
            }
            None => {
                if !ctx.is_staff && ctx.user_id != Some(activity.author_id) {
                    return Err(AppError::authorization("No permission to delete activity"));
                }
            }
        }

        self.activity_repo.delete(activity.id).await?;

        // Row deletion cascades in the store; stored blobs (published
        // file, featured image, waypoint media) live under one prefix.
        if let Err(e) = self
            .media_store
            .delete_prefix(&activity.file_directory_path())
            .await
        {
            warn!(activity_id = %activity.id, error = %e, "Failed to delete activity files");
        }

        info!(
            user_id = ?ctx.user_id,
            activity_id = %activity.id,
            "Activity deleted"
        );

        Ok(())
    }

    /// Publishes an activity: stores the serialized artifact produced by
    /// the caller, stamps `last_published`, and clears
    /// `unpublished_changes`.
    pub async fn publish(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        content: Bytes,
    ) -> AppResult<Activity> {
        let activity = self.get_activity(ctx, id).await?;
        self.authorizer
            .require_write(ctx.user_id, ctx.is_staff, &activity)
            .await?;

        self.media_store
            .save(&activity.published_file_path(), content)
            .await?;

        let published = self
            .activity_repo
            .set_published(activity.id, Utc::now())
            .await?;

        info!(
            user_id = ?ctx.user_id,
            activity_id = %published.id,
            "Activity published"
        );

        Ok(published)
    }

    /// Stores a featured image for the activity and records its path.
    pub async fn set_featured_image(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        data: Bytes,
        file_extension: &str,
    ) -> AppResult<Activity> {
        let activity = self.get_activity(ctx, id).await?;
        self.authorizer
            .require_write(ctx.user_id, ctx.is_staff, &activity)
            .await?;

        let path = format!(
            "{}/featured_image.{}",
            activity.file_directory_path(),
            file_extension.trim_start_matches('.')
        );
        self.media_store.save(&path, data).await?;

        let updated = self.activity_repo.set_image(activity.id, Some(&path)).await?;

        info!(
            user_id = ?ctx.user_id,
            activity_id = %updated.id,
            path = %path,
            "Featured image stored"
        );

        Ok(updated)
    }
}
