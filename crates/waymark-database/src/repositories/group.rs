//! Waypoint group repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use waymark_core::error::{AppError, ErrorKind};
use waymark_core::result::AppResult;
use waymark_entity::waypoint::{CreateWaypointGroup, WaypointGroup, WaypointGroupKind};

use super::activity::{begin_error, commit_error};

/// Repository for waypoint group CRUD.
#[derive(Debug, Clone)]
pub struct WaypointGroupRepository {
    pool: PgPool,
}

impl WaypointGroupRepository {
    /// Create a new waypoint group repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a group by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<WaypointGroup>> {
        sqlx::query_as::<_, WaypointGroup>("SELECT * FROM waypoint_groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find group", e))
    }

    /// List the groups of an activity.
    pub async fn find_for_activity(&self, activity_id: Uuid) -> AppResult<Vec<WaypointGroup>> {
        sqlx::query_as::<_, WaypointGroup>(
            "SELECT * FROM waypoint_groups WHERE activity_id = $1 ORDER BY created_at ASC",
        )
        .bind(activity_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list groups", e))
    }

    /// Create a group and flag the owning activity, in one transaction.
    pub async fn create(&self, data: &CreateWaypointGroup) -> AppResult<WaypointGroup> {
        let mut tx = self.pool.begin().await.map_err(begin_error)?;

        let group = sqlx::query_as::<_, WaypointGroup>(
            "INSERT INTO waypoint_groups (activity_id, name, kind) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(data.activity_id)
        .bind(&data.name)
        .bind(data.kind)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create group", e))?;

        flag_activity(&mut tx, data.activity_id).await?;
        tx.commit().await.map_err(commit_error)?;

        Ok(group)
    }

    /// Rename or retype a group and flag the owning activity.
    pub async fn update(
        &self,
        id: Uuid,
        activity_id: Uuid,
        name: Option<&str>,
        kind: WaypointGroupKind,
    ) -> AppResult<WaypointGroup> {
        let mut tx = self.pool.begin().await.map_err(begin_error)?;

        let group = sqlx::query_as::<_, WaypointGroup>(
            "UPDATE waypoint_groups SET name = $2, kind = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(kind)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update group", e))?
        .ok_or_else(|| AppError::not_found(format!("Waypoint group {id} not found")))?;

        flag_activity(&mut tx, activity_id).await?;
        tx.commit().await.map_err(commit_error)?;

        Ok(group)
    }

    /// Delete a group (cascades to waypoints and media rows) and flag the
    /// owning activity.
    pub async fn delete(&self, id: Uuid, activity_id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool.begin().await.map_err(begin_error)?;

        let result = sqlx::query("DELETE FROM waypoint_groups WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete group", e))?;

        flag_activity(&mut tx, activity_id).await?;
        tx.commit().await.map_err(commit_error)?;

        Ok(result.rows_affected() > 0)
    }
}

/// Set `unpublished_changes` on the owning activity within the caller's
/// transaction.
pub(crate) async fn flag_activity(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    activity_id: Uuid,
) -> AppResult<()> {
    sqlx::query(
        "UPDATE activities SET unpublished_changes = TRUE, updated_at = NOW() WHERE id = $1",
    )
    .bind(activity_id)
    .execute(&mut **tx)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to flag activity", e))?;
    Ok(())
}
