//! Folder grant repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use waymark_core::error::{AppError, ErrorKind};
use waymark_core::result::AppResult;
use waymark_entity::grant::{CreateGrant, FolderGrant, GrantAccess};

/// Repository for folder grant CRUD and resolution lookups.
#[derive(Debug, Clone)]
pub struct GrantRepository {
    pool: PgPool,
}

impl GrantRepository {
    /// Create a new grant repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a grant by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<FolderGrant>> {
        sqlx::query_as::<_, FolderGrant>("SELECT * FROM folder_grants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find grant", e))
    }

    /// List the grants attached to a folder.
    pub async fn find_for_folder(&self, folder_id: Uuid) -> AppResult<Vec<FolderGrant>> {
        sqlx::query_as::<_, FolderGrant>(
            "SELECT * FROM folder_grants WHERE folder_id = $1 ORDER BY created_at ASC",
        )
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list grants", e))
    }

    /// Every grant on any of the given folders that applies to the user
    /// directly or through one of the given teams. This is the single
    /// query behind ancestor-chain resolution.
    pub async fn find_applicable(
        &self,
        folder_ids: &[Uuid],
        user_id: Uuid,
        team_ids: &[Uuid],
    ) -> AppResult<Vec<FolderGrant>> {
        sqlx::query_as::<_, FolderGrant>(
            "SELECT * FROM folder_grants \
             WHERE folder_id = ANY($1) AND (user_id = $2 OR team_id = ANY($3))",
        )
        .bind(folder_ids)
        .bind(user_id)
        .bind(team_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to resolve grants", e)
        })
    }

    /// IDs of folders carrying a direct grant for the user or any of the
    /// given teams, at any access level. Seeds the accessible-set
    /// expansion.
    pub async fn find_granted_folder_ids(
        &self,
        user_id: Uuid,
        team_ids: &[Uuid],
    ) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT DISTINCT folder_id FROM folder_grants \
             WHERE user_id = $1 OR team_id = ANY($2)",
        )
        .bind(user_id)
        .bind(team_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list granted folders", e)
        })
    }

    /// Create a new grant.
    pub async fn create(&self, data: &CreateGrant) -> AppResult<FolderGrant> {
        sqlx::query_as::<_, FolderGrant>(
            "INSERT INTO folder_grants (folder_id, user_id, team_id, access) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.folder_id)
        .bind(data.principal.user_id())
        .bind(data.principal.team_id())
        .bind(data.access)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err)
                if matches!(
                    db_err.constraint(),
                    Some("folder_grants_folder_user_key") | Some("folder_grants_folder_team_key")
                ) =>
            {
                AppError::conflict(format!(
                    "{} already has a grant on this folder",
                    data.principal
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create grant", e),
        })
    }

    /// Change the access level of an existing grant.
    pub async fn update_access(&self, id: Uuid, access: GrantAccess) -> AppResult<FolderGrant> {
        sqlx::query_as::<_, FolderGrant>(
            "UPDATE folder_grants SET access = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(access)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update grant", e))?
        .ok_or_else(|| AppError::not_found(format!("Grant {id} not found")))
    }

    /// Delete a grant.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM folder_grants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete grant", e))?;
        Ok(result.rows_affected() > 0)
    }
}
