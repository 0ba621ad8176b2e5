//! Waypoint CRUD through the ordering engine.
//!
//! Ordered groups keep their indices a dense zero-based permutation at
//! every committed state: inserts append at the end, reorders swap
//! adjacent slots inside one transaction, deletes compact the remainder.
//! Unordered and geofence groups bypass all index maintenance.

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
use waymark_database::repositories::waypoint::WaypointRepository;
use waymark_entity::activity::Activity;
use waymark_entity::waypoint::{CreateWaypoint, UpdateWaypoint, Waypoint, WaypointGroup};

use crate::context::RequestContext;

use super::ordering::{self, ReorderPlan};

/// Request to create a waypoint. Ordered groups assign the index
/// server-side by appending.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateWaypointRequest {
    /// The group to add the waypoint to.
    pub group_id: Uuid,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Waypoint name.
    pub name: String,
    /// Long-form description.
    pub description: Option<String>,
    /// Departure callout.
    pub departure_callout: Option<String>,
    /// Arrival callout.
    pub arrival_callout: Option<String>,
}

/// Request to update a waypoint. A changed `index` routes through the
/// reorder engine; `None` leaves the position untouched.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpdateWaypointRequest {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Waypoint name.
    pub name: String,
    /// Long-form description.
    pub description: Option<String>,
    /// Departure callout.
    pub departure_callout: Option<String>,
    /// Arrival callout.
    pub arrival_callout: Option<String>,
    /// Requested position within an ordered group.
    pub index: Option<i32>,
}

impl UpdateWaypointRequest {
    fn fields(&self) -> UpdateWaypoint {
        UpdateWaypoint {
            latitude: self.latitude,
            longitude: self.longitude,
            name: self.name.clone(),
            description: self.description.clone(),
            departure_callout: self.departure_callout.clone(),
            arrival_callout: self.arrival_callout.clone(),
        }
    }
}

/// Manages waypoints and their ordered indices.
#[derive(Debug, Clone)]
pub struct WaypointService {
    /// Waypoint repository.
    waypoint_repo: Arc<WaypointRepository>,
    /// Waypoint group repository.
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

impl WaypointService {
    /// Creates a new waypoint service.
    pub fn new(
        waypoint_repo: Arc<WaypointRepository>,
        group_repo: Arc<WaypointGroupRepository>,
        activity_repo: Arc<ActivityRepository>,
        media_repo: Arc<WaypointMediaRepository>,
        authorizer: Arc<ActivityAuthorizer>,
        media_store: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            waypoint_repo,
            group_repo,
            activity_repo,
            media_repo,
            authorizer,
            media_store,
        }
    }

    /// Lists the waypoints of a group in index order.
    pub async fn list_for_group(
        &self,
        ctx: &RequestContext,
        group_id: Uuid,
    ) -> AppResult<Vec<Waypoint>> {
        let (group, activity) = self.group_with_activity(group_id).await?;
        if !self
            .authorizer
            .can_read(ctx.user_id, ctx.is_staff, &activity)
            .await?
        {
            return Err(AppError::not_found("Waypoint group not found"));
        }
        self.waypoint_repo.find_for_group(group.id).await
    }

    /// Creates a waypoint. In an ordered group the new waypoint is
    /// appended at index `max + 1` (0 for an empty group).
    pub async fn create_waypoint(
        &self,
        ctx: &RequestContext,
        req: CreateWaypointRequest,
    ) -> AppResult<Waypoint> {
        let (group, activity) = self.group_with_activity(req.group_id).await?;
        self.authorizer
            .require_write(ctx.user_id, ctx.is_staff, &activity)
            .await?;

        let data = CreateWaypoint {
            group_id: group.id,
            latitude: req.latitude,
            longitude: req.longitude,
            name: req.name,
            description: req.description,
            departure_callout: req.departure_callout,
            arrival_callout: req.arrival_callout,
        };

        let waypoint = if group.kind.is_ordered() {
            self.waypoint_repo
                .create_ordered_append(&data, activity.id)
                .await?
        } else {
            self.waypoint_repo
                .create_unordered(&data, activity.id)
                .await?
        };

        info!(
            user_id = ?ctx.user_id,
            waypoint_id = %waypoint.id,
            group_id = %group.id,
            index = ?waypoint.index,
            "Waypoint created"
        );

        Ok(waypoint)
    }

    /// Updates a waypoint, reordering within its group when the requested
    /// index differs from the current one.
    ///
    /// Returns every waypoint whose index changed: just the updated
    /// waypoint for plain edits, the moved pair for a swap.
    pub async fn update_waypoint(
        &self,
        ctx: &RequestContext,
        waypoint_id: Uuid,
        req: UpdateWaypointRequest,
    ) -> AppResult<Vec<Waypoint>> {
        let waypoint = self
            .waypoint_repo
            .find_by_id(waypoint_id)
            .await?
            .ok_or_else(|| AppError::not_found("Waypoint not found"))?;
        let (group, activity) = self.group_with_activity(waypoint.group_id).await?;
        self.authorizer
            .require_write(ctx.user_id, ctx.is_staff, &activity)
            .await?;

        let fields = req.fields();

        // Only ordered groups maintain indices; everything else is a
        // plain field update.
        let (current_index, target_index) = match (group.kind.is_ordered(), waypoint.index, req.index)
        {
            (true, Some(current), Some(target)) => (current, target),
            _ => {
                let updated = self
                    .waypoint_repo
                    .update_fields(waypoint.id, &fields, None, activity.id)
                    .await?;
                return Ok(vec![updated]);
            }
        };

        match ordering::plan_reorder(current_index, target_index)? {
            ReorderPlan::NoOp => {
                let updated = self
                    .waypoint_repo
                    .update_fields(waypoint.id, &fields, None, activity.id)
                    .await?;
                Ok(vec![updated])
            }
            ReorderPlan::Adjacent { vacated, target } => {
                let affected = match self
                    .waypoint_repo
                    .find_by_group_and_index(group.id, target)
                    .await?
                {
                    Some(occupant) => {
                        self.waypoint_repo
                            .swap_reorder(
                                waypoint.id,
                                occupant.id,
                                vacated,
                                target,
                                &fields,
                                activity.id,
                            )
                            .await?
                    }
                    // The target slot is empty. Under the dense invariant
                    // this should not happen; fill the gap with a direct
                    // write.
                    None => vec![
                        self.waypoint_repo
                            .update_fields(waypoint.id, &fields, Some(target), activity.id)
                            .await?,
                    ],
                };

                info!(
                    user_id = ?ctx.user_id,
                    waypoint_id = %waypoint.id,
                    from = vacated,
                    to = target,
                    "Waypoint reordered"
                );

                Ok(affected)
            }
        }
    }

    /// Deletes a waypoint. In an ordered group the remaining indices are
    /// compacted to close the gap; the shifted waypoints are returned.
    pub async fn delete_waypoint(
        &self,
        ctx: &RequestContext,
        waypoint_id: Uuid,
    ) -> AppResult<Vec<Waypoint>> {
        let waypoint = self
            .waypoint_repo
            .find_by_id(waypoint_id)
            .await?
            .ok_or_else(|| AppError::not_found("Waypoint not found"))?;
        let (group, activity) = self.group_with_activity(waypoint.group_id).await?;
        self.authorizer
            .require_write(ctx.user_id, ctx.is_staff, &activity)
            .await?;

        let media_paths = self
            .media_repo
            .find_paths_for_waypoint(waypoint.id)
            .await?;

        let deleted_index = if group.kind.is_ordered() {
            waypoint.index
        } else {
            None
        };

        let shifted = self
            .waypoint_repo
            .delete_and_compact(waypoint.id, group.id, deleted_index, activity.id)
            .await?;

        // Media rows went with the cascade; remove their blobs.
        for path in media_paths {
            if let Err(e) = self.media_store.delete(&path).await {
                warn!(waypoint_id = %waypoint.id, path = %path, error = %e, "Failed to delete media blob");
            }
        }

        info!(
            user_id = ?ctx.user_id,
            waypoint_id = %waypoint.id,
            group_id = %group.id,
            shifted = shifted.len(),
            "Waypoint deleted"
        );

        Ok(shifted)
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
