//! Activity write authorization.

use std::sync::Arc;

use uuid::Uuid;

use waymark_core::error::AppError;
use waymark_core::result::AppResult;
use waymark_database::repositories::folder::FolderRepository;
use waymark_entity::activity::Activity;

use super::resolver::FolderAccessResolver;

/// Authorizes reads and writes against activities.
///
/// A filed activity delegates entirely to its folder's sharing; an
/// unfiled activity belongs to its author alone (staff excepted).
#[derive(Debug, Clone)]
pub struct ActivityAuthorizer {
    /// Folder access resolver.
    resolver: Arc<FolderAccessResolver>,
    /// Folder repository for resolving the owning folder.
    folder_repo: Arc<FolderRepository>,
}

impl ActivityAuthorizer {
    /// Creates a new activity authorizer.
    pub fn new(resolver: Arc<FolderAccessResolver>, folder_repo: Arc<FolderRepository>) -> Self {
        Self {
            resolver,
            folder_repo,
        }
    }

    /// Whether the user may modify the activity.
    pub async fn can_write(
        &self,
        user_id: Option<Uuid>,
        is_staff: bool,
        activity: &Activity,
    ) -> AppResult<bool> {
        let Some(user_id) = user_id else {
            return Ok(false);
        };
        if is_staff {
            return Ok(true);
        }

        match activity.folder_id {
            Some(folder_id) => match self.folder_repo.find_by_id(folder_id).await? {
                Some(folder) => {
                    let access = self
                        .resolver
                        .resolve(Some(user_id), is_staff, &folder)
                        .await?;
                    Ok(access.can_write)
                }
                // A dangling folder reference means nobody but staff can
                // write through it.
                None => Ok(false),
            },
            None => Ok(activity.author_id == user_id),
        }
    }

    /// Whether the user may view the activity.
    pub async fn can_read(
        &self,
        user_id: Option<Uuid>,
        is_staff: bool,
        activity: &Activity,
    ) -> AppResult<bool> {
        let Some(user_id) = user_id else {
            return Ok(false);
        };
        if is_staff {
            return Ok(true);
        }
        if activity.author_id == user_id {
            return Ok(true);
        }

        match activity.folder_id {
            Some(folder_id) => match self.folder_repo.find_by_id(folder_id).await? {
                Some(folder) => {
                    let access = self
                        .resolver
                        .resolve(Some(user_id), is_staff, &folder)
                        .await?;
                    Ok(access.can_read)
                }
                None => Ok(false),
            },
            None => Ok(false),
        }
    }

    /// Rejects callers who cannot modify the activity.
    pub async fn require_write(
        &self,
        user_id: Option<Uuid>,
        is_staff: bool,
        activity: &Activity,
    ) -> AppResult<()> {
        if self.can_write(user_id, is_staff, activity).await? {
            Ok(())
        } else {
            Err(AppError::authorization("No write access to activity"))
        }
    }
}
