//! Waypoint repository implementation.
//!
//! Home of the ordered-index maintenance transactions. Each multi-step
//! operation runs in a single transaction so no other connection ever
//! observes a duplicated index or the `-1` displacement slot; the
//! `waypoints_group_index_key` uniqueness constraint is the storage-level
//! backstop, and a violation surfaces as a retriable conflict.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use waymark_core::error::{AppError, ErrorKind};
use waymark_core::result::AppResult;
use waymark_entity::waypoint::{CreateWaypoint, UpdateWaypoint, Waypoint};

use super::activity::{begin_error, commit_error};
use super::group::flag_activity;

/// Repository for waypoint CRUD and ordered-index maintenance.
#[derive(Debug, Clone)]
pub struct WaypointRepository {
    pool: PgPool,
}

impl WaypointRepository {
    /// Create a new waypoint repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a waypoint by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Waypoint>> {
        sqlx::query_as::<_, Waypoint>("SELECT * FROM waypoints WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find waypoint", e))
    }

    /// List the waypoints of a group in index order.
    pub async fn find_for_group(&self, group_id: Uuid) -> AppResult<Vec<Waypoint>> {
        sqlx::query_as::<_, Waypoint>(
            "SELECT * FROM waypoints WHERE group_id = $1 \
             ORDER BY \"index\" ASC NULLS LAST, created_at ASC",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list waypoints", e))
    }

    /// The waypoint currently holding an index within a group, if any.
    pub async fn find_by_group_and_index(
        &self,
        group_id: Uuid,
        index: i32,
    ) -> AppResult<Option<Waypoint>> {
        sqlx::query_as::<_, Waypoint>(
            "SELECT * FROM waypoints WHERE group_id = $1 AND \"index\" = $2",
        )
        .bind(group_id)
        .bind(index)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find waypoint", e))
    }

    /// Insert a waypoint without index maintenance (unordered and geofence
    /// groups).
    pub async fn create_unordered(
        &self,
        data: &CreateWaypoint,
        activity_id: Uuid,
    ) -> AppResult<Waypoint> {
        let mut tx = self.pool.begin().await.map_err(begin_error)?;
        let waypoint = insert_waypoint(&mut tx, data, None).await?;
        flag_activity(&mut tx, activity_id).await?;
        tx.commit().await.map_err(commit_error)?;
        Ok(waypoint)
    }

    /// Append a waypoint to the end of an ordered group.
    ///
    /// The index is the current group maximum plus one (zero for an empty
    /// group), read inside the same transaction as the insert. Two racing
    /// appends can still compute the same value; the second one fails on
    /// the uniqueness constraint and is reported retriable.
    pub async fn create_ordered_append(
        &self,
        data: &CreateWaypoint,
        activity_id: Uuid,
    ) -> AppResult<Waypoint> {
        let mut tx = self.pool.begin().await.map_err(begin_error)?;

        let next_index: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(\"index\") + 1, 0) FROM waypoints WHERE group_id = $1",
        )
        .bind(data.group_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to compute index", e))?;

        let waypoint = insert_waypoint(&mut tx, data, Some(next_index)).await?;
        flag_activity(&mut tx, activity_id).await?;
        tx.commit().await.map_err(commit_error)?;
        Ok(waypoint)
    }

    /// Update a waypoint's fields, optionally writing a new index directly.
    /// Used when no other waypoint occupies the target slot.
    pub async fn update_fields(
        &self,
        id: Uuid,
        data: &UpdateWaypoint,
        index: Option<i32>,
        activity_id: Uuid,
    ) -> AppResult<Waypoint> {
        let mut tx = self.pool.begin().await.map_err(begin_error)?;
        let waypoint = update_waypoint(&mut tx, id, data, index).await?;
        flag_activity(&mut tx, activity_id).await?;
        tx.commit().await.map_err(commit_error)?;
        Ok(waypoint)
    }

    /// Swap the moving waypoint into `target_index`, displacing the current
    /// occupant back to the vacated slot.
    ///
    /// The occupant is parked at `-1` for the duration of the transaction
    /// so the uniqueness constraint holds at every statement boundary;
    /// the sentinel is never visible outside the transaction.
    pub async fn swap_reorder(
        &self,
        moving_id: Uuid,
        occupant_id: Uuid,
        vacated_index: i32,
        target_index: i32,
        data: &UpdateWaypoint,
        activity_id: Uuid,
    ) -> AppResult<Vec<Waypoint>> {
        let mut tx = self.pool.begin().await.map_err(begin_error)?;

        sqlx::query("UPDATE waypoints SET \"index\" = -1, updated_at = NOW() WHERE id = $1")
            .bind(occupant_id)
            .execute(&mut *tx)
            .await
            .map_err(map_index_conflict)?;

        let moved = update_waypoint(&mut tx, moving_id, data, Some(target_index)).await?;

        let occupant = sqlx::query_as::<_, Waypoint>(
            "UPDATE waypoints SET \"index\" = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(occupant_id)
        .bind(vacated_index)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_index_conflict)?;

        flag_activity(&mut tx, activity_id).await?;
        tx.commit().await.map_err(commit_error)?;

        Ok(vec![moved, occupant])
    }

    /// Delete a waypoint and, for ordered groups, close the gap it leaves.
    ///
    /// Remaining indices above the deleted one are decremented one row at a
    /// time in ascending order: each update moves a row into the slot the
    /// previous step vacated, so the uniqueness constraint is satisfied at
    /// every intermediate state. Returns the waypoints whose index shifted.
    pub async fn delete_and_compact(
        &self,
        id: Uuid,
        group_id: Uuid,
        deleted_index: Option<i32>,
        activity_id: Uuid,
    ) -> AppResult<Vec<Waypoint>> {
        let mut tx = self.pool.begin().await.map_err(begin_error)?;

        let result = sqlx::query("DELETE FROM waypoints WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete waypoint", e)
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Waypoint {id} not found")));
        }

        let mut shifted = Vec::new();
        if let Some(deleted_index) = deleted_index {
            let above: Vec<Uuid> = sqlx::query_scalar(
                "SELECT id FROM waypoints WHERE group_id = $1 AND \"index\" > $2 \
                 ORDER BY \"index\" ASC",
            )
            .bind(group_id)
            .bind(deleted_index)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list trailing waypoints", e)
            })?;

            for waypoint_id in above {
                let waypoint = sqlx::query_as::<_, Waypoint>(
                    "UPDATE waypoints SET \"index\" = \"index\" - 1, updated_at = NOW() \
                     WHERE id = $1 RETURNING *",
                )
                .bind(waypoint_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(map_index_conflict)?;
                shifted.push(waypoint);
            }
        }

        flag_activity(&mut tx, activity_id).await?;
        tx.commit().await.map_err(commit_error)?;

        Ok(shifted)
    }
}

async fn insert_waypoint(
    tx: &mut Transaction<'_, Postgres>,
    data: &CreateWaypoint,
    index: Option<i32>,
) -> AppResult<Waypoint> {
    sqlx::query_as::<_, Waypoint>(
        "INSERT INTO waypoints \
         (group_id, \"index\", latitude, longitude, name, description, \
          departure_callout, arrival_callout) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(data.group_id)
    .bind(index)
    .bind(data.latitude)
    .bind(data.longitude)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.departure_callout)
    .bind(&data.arrival_callout)
    .fetch_one(&mut **tx)
    .await
    .map_err(map_index_conflict)
}

async fn update_waypoint(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    data: &UpdateWaypoint,
    index: Option<i32>,
) -> AppResult<Waypoint> {
    sqlx::query_as::<_, Waypoint>(
        "UPDATE waypoints SET \
         latitude = $2, longitude = $3, name = $4, description = $5, \
         departure_callout = $6, arrival_callout = $7, \
         \"index\" = COALESCE($8, \"index\"), updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(data.latitude)
    .bind(data.longitude)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.departure_callout)
    .bind(&data.arrival_callout)
    .bind(index)
    .fetch_optional(&mut **tx)
    .await
    .map_err(map_index_conflict)?
    .ok_or_else(|| AppError::not_found(format!("Waypoint {id} not found")))
}

/// Map a `(group_id, index)` uniqueness violation to a retriable conflict.
fn map_index_conflict(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db_err)
            if db_err.constraint() == Some("waypoints_group_index_key") =>
        {
            AppError::conflict("Waypoint index was modified concurrently; retry the operation")
        }
        _ => AppError::with_source(ErrorKind::Database, "Failed to write waypoint", e),
    }
}
