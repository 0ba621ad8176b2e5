//! Waypoint media repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use waymark_core::error::{AppError, ErrorKind};
use waymark_core::result::AppResult;
use waymark_entity::waypoint::{CreateWaypointMedia, WaypointMedia};

use super::activity::{begin_error, commit_error};
use super::group::flag_activity;

/// Repository for waypoint media rows. Blob lifecycle is handled by the
/// service layer through the media store; rows only carry the path.
#[derive(Debug, Clone)]
pub struct WaypointMediaRepository {
    pool: PgPool,
}

impl WaypointMediaRepository {
    /// Create a new waypoint media repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a media row by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<WaypointMedia>> {
        sqlx::query_as::<_, WaypointMedia>("SELECT * FROM waypoint_media WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find media", e))
    }

    /// List the media attached to a waypoint.
    pub async fn find_for_waypoint(&self, waypoint_id: Uuid) -> AppResult<Vec<WaypointMedia>> {
        sqlx::query_as::<_, WaypointMedia>(
            "SELECT * FROM waypoint_media WHERE waypoint_id = $1 \
             ORDER BY \"index\" ASC NULLS LAST, created_at ASC",
        )
        .bind(waypoint_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list media", e))
    }

    /// Stored blob paths for every media row under a waypoint.
    pub async fn find_paths_for_waypoint(&self, waypoint_id: Uuid) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT media_path FROM waypoint_media WHERE waypoint_id = $1",
        )
        .bind(waypoint_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list media paths", e))
    }

    /// Stored blob paths for every media row under a group's waypoints.
    /// Used to clean up blobs before a cascading group delete.
    pub async fn find_paths_for_group(&self, group_id: Uuid) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT m.media_path FROM waypoint_media m \
             INNER JOIN waypoints w ON w.id = m.waypoint_id \
             WHERE w.group_id = $1",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list media paths", e))
    }

    /// Attach media to a waypoint and flag the owning activity.
    pub async fn create(
        &self,
        data: &CreateWaypointMedia,
        activity_id: Uuid,
    ) -> AppResult<WaypointMedia> {
        let mut tx = self.pool.begin().await.map_err(begin_error)?;

        let media = sqlx::query_as::<_, WaypointMedia>(
            "INSERT INTO waypoint_media \
             (waypoint_id, media_path, kind, mime_type, description, \"index\") \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.waypoint_id)
        .bind(&data.media_path)
        .bind(data.kind)
        .bind(&data.mime_type)
        .bind(&data.description)
        .bind(data.index)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create media", e))?;

        flag_activity(&mut tx, activity_id).await?;
        tx.commit().await.map_err(commit_error)?;

        Ok(media)
    }

    /// Update a media row's description and display order.
    pub async fn update(
        &self,
        id: Uuid,
        activity_id: Uuid,
        description: Option<&str>,
        index: Option<i32>,
    ) -> AppResult<WaypointMedia> {
        let mut tx = self.pool.begin().await.map_err(begin_error)?;

        let media = sqlx::query_as::<_, WaypointMedia>(
            "UPDATE waypoint_media SET description = $2, \"index\" = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(description)
        .bind(index)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update media", e))?
        .ok_or_else(|| AppError::not_found(format!("Waypoint media {id} not found")))?;

        flag_activity(&mut tx, activity_id).await?;
        tx.commit().await.map_err(commit_error)?;

        Ok(media)
    }

    /// Delete a media row and flag the owning activity.
    pub async fn delete(&self, id: Uuid, activity_id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool.begin().await.map_err(begin_error)?;

        let result = sqlx::query("DELETE FROM waypoint_media WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete media", e))?;

        flag_activity(&mut tx, activity_id).await?;
        tx.commit().await.map_err(commit_error)?;

        Ok(result.rows_affected() > 0)
    }
}
