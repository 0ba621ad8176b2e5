//! Folder grant entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::access::GrantAccess;
use super::principal::Principal;

/// A permission grant attaching an access level to a (folder, principal)
/// pair. Grants live on one folder and are walked at resolution time; they
/// are never copied down the tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderGrant {
    /// Unique grant identifier.
    pub id: Uuid,
    /// The folder the grant attaches to.
    pub folder_id: Uuid,
    /// The user or team receiving access.
    pub principal: Principal,
    /// Granted access level.
    pub access: GrantAccess,
    /// When the grant was created.
    pub created_at: DateTime<Utc>,
    /// When the grant was last updated.
    pub updated_at: DateTime<Utc>,
}

// The principal is persisted as two nullable columns guarded by a check
// constraint; decoding folds them back into the tagged enum.
impl FromRow<'_, PgRow> for FolderGrant {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let user_id: Option<Uuid> = row.try_get("user_id")?;
        let team_id: Option<Uuid> = row.try_get("team_id")?;

        let principal = match (user_id, team_id) {
            (Some(id), None) => Principal::User(id),
            (None, Some(id)) => Principal::Team(id),
            _ => {
                return Err(sqlx::Error::ColumnDecode {
                    index: "user_id".to_string(),
                    source: "folder grant row must have exactly one principal column set".into(),
                });
            }
        };

        Ok(Self {
            id: row.try_get("id")?,
            folder_id: row.try_get("folder_id")?,
            principal,
            access: row.try_get("access")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Data required to create a new grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGrant {
    /// The folder the grant attaches to.
    pub folder_id: Uuid,
    /// The user or team receiving access.
    pub principal: Principal,
    /// Granted access level.
    pub access: GrantAccess,
}
