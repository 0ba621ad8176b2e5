//! Activity repository implementation.
//!
//! Every mutating statement here either sets `unpublished_changes` itself
//! or is the explicit publish path that clears it.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use waymark_core::error::{AppError, ErrorKind};
use waymark_core::result::AppResult;
use waymark_entity::activity::{Activity, ActivityKind, CreateActivity};
use waymark_entity::waypoint::WaypointGroup;

/// Replacement field values for an activity update. `folder_id` carries
/// the full new state: `None` files the activity out of any folder.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpdateActivity {
    /// Activity title.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Activity kind.
    pub kind: ActivityKind,
    /// Content locale.
    pub locale: String,
    /// Availability window start.
    pub start_at: Option<DateTime<Utc>>,
    /// Availability window end.
    pub end_at: Option<DateTime<Utc>>,
    /// Whether the activity expires.
    pub expires: bool,
    /// Featured image alt text.
    pub image_alt: Option<String>,
    /// Owning folder.
    pub folder_id: Option<Uuid>,
}

/// Repository for activity CRUD and listing queries.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    /// Create a new activity repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an activity by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Activity>> {
        sqlx::query_as::<_, Activity>("SELECT * FROM activities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find activity", e))
    }

    /// Activities visible to a user: authored unfiled ones plus everything
    /// in the accessible folder set.
    pub async fn find_accessible(
        &self,
        author_id: Uuid,
        folder_ids: &[Uuid],
    ) -> AppResult<Vec<Activity>> {
        sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities \
             WHERE (author_id = $1 AND folder_id IS NULL) OR folder_id = ANY($2) \
             ORDER BY created_at DESC",
        )
        .bind(author_id)
        .bind(folder_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list activities", e))
    }

    /// Activities filed under a specific folder.
    pub async fn find_by_folder(&self, folder_id: Uuid) -> AppResult<Vec<Activity>> {
        sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities WHERE folder_id = $1 ORDER BY created_at DESC",
        )
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list activities", e))
    }

    /// Unfiled activities authored by a user.
    pub async fn find_unfiled_by_author(&self, author_id: Uuid) -> AppResult<Vec<Activity>> {
        sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities WHERE author_id = $1 AND folder_id IS NULL \
             ORDER BY created_at DESC",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list activities", e))
    }

    /// Create an activity together with its default waypoint groups, in one
    /// transaction.
    pub async fn create_with_default_groups(
        &self,
        data: &CreateActivity,
        route_group_name: &str,
        poi_group_name: &str,
    ) -> AppResult<(Activity, Vec<WaypointGroup>)> {
        let mut tx = self.pool.begin().await.map_err(begin_error)?;

        let activity = sqlx::query_as::<_, Activity>(
            "INSERT INTO activities \
             (author_id, author_name, author_email, name, description, kind, locale, \
              start_at, end_at, expires, folder_id, unpublished_changes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, TRUE) RETURNING *",
        )
        .bind(data.author_id)
        .bind(&data.author_name)
        .bind(&data.author_email)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.kind)
        .bind(&data.locale)
        .bind(data.start_at)
        .bind(data.end_at)
        .bind(data.expires)
        .bind(data.folder_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create activity", e))?;

        let route_group = sqlx::query_as::<_, WaypointGroup>(
            "INSERT INTO waypoint_groups (activity_id, name, kind) \
             VALUES ($1, $2, 'ordered') RETURNING *",
        )
        .bind(activity.id)
        .bind(route_group_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create route group", e)
        })?;

        let poi_group = sqlx::query_as::<_, WaypointGroup>(
            "INSERT INTO waypoint_groups (activity_id, name, kind) \
             VALUES ($1, $2, 'unordered') RETURNING *",
        )
        .bind(activity.id)
        .bind(poi_group_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create POI group", e))?;

        tx.commit().await.map_err(commit_error)?;

        Ok((activity, vec![route_group, poi_group]))
    }

    /// Replace an activity's mutable fields. Always flags unpublished
    /// changes.
    pub async fn update(&self, id: Uuid, data: &UpdateActivity) -> AppResult<Activity> {
        sqlx::query_as::<_, Activity>(
            "UPDATE activities SET \
             name = $2, description = $3, kind = $4, locale = $5, start_at = $6, \
             end_at = $7, expires = $8, image_alt = $9, folder_id = $10, \
             unpublished_changes = TRUE, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.kind)
        .bind(&data.locale)
        .bind(data.start_at)
        .bind(data.end_at)
        .bind(data.expires)
        .bind(&data.image_alt)
        .bind(data.folder_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update activity", e))?
        .ok_or_else(|| AppError::not_found(format!("Activity {id} not found")))
    }

    /// Record the stored path of the featured image.
    pub async fn set_image(&self, id: Uuid, image_path: Option<&str>) -> AppResult<Activity> {
        sqlx::query_as::<_, Activity>(
            "UPDATE activities SET image_path = $2, unpublished_changes = TRUE, \
             updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(image_path)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set image", e))?
        .ok_or_else(|| AppError::not_found(format!("Activity {id} not found")))
    }

    /// Mark the activity as having unpublished changes. Called explicitly
    /// from every descendant-entity write path, inside that path's
    /// transaction where one exists.
    pub async fn mark_unpublished_changes(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE activities SET unpublished_changes = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to flag activity", e))?;
        Ok(())
    }

    /// Stamp a publish: the only write that clears `unpublished_changes`.
    pub async fn set_published(&self, id: Uuid, published_at: DateTime<Utc>) -> AppResult<Activity> {
        sqlx::query_as::<_, Activity>(
            "UPDATE activities SET last_published = $2, unpublished_changes = FALSE, \
             updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(published_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record publish", e))?
        .ok_or_else(|| AppError::not_found(format!("Activity {id} not found")))
    }

    /// Delete an activity (cascades to groups, waypoints, and media rows).
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete activity", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}

pub(crate) fn begin_error(e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
}

pub(crate) fn commit_error(e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
}
