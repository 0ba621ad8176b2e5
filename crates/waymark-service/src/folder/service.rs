//! Folder CRUD with sharing enforcement and tree-shape guards.
//!
//! Structural changes are validated before any write: a folder can never
//! become its own ancestor, and root folder names share one global
//! namespace. Inaccessible folders are reported as missing so reads do
//! not leak existence.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use waymark_auth::FolderAccessResolver;
use waymark_core::error::AppError;
use waymark_core::result::AppResult;
use waymark_core::types::pagination::{PageRequest, PageResponse};
use waymark_database::repositories::folder::FolderRepository;
use waymark_entity::folder::{CreateFolder, Folder};

use crate::context::RequestContext;

/// Manages folder CRUD operations.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Folder repository.
    folder_repo: Arc<FolderRepository>,
    /// Access resolver.
    resolver: Arc<FolderAccessResolver>,
}

/// Request to create a new folder.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateFolderRequest {
    /// Folder name.
    pub name: String,
    /// Parent folder ID (None for a root folder).
    pub parent_id: Option<Uuid>,
}

/// Request to rename and/or move a folder.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpdateFolderRequest {
    /// New folder name.
    pub name: String,
    /// New parent folder ID (None moves the folder to the root level).
    pub parent_id: Option<Uuid>,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(folder_repo: Arc<FolderRepository>, resolver: Arc<FolderAccessResolver>) -> Self {
        Self {
            folder_repo,
            resolver,
        }
    }

    /// Lists every folder the caller can access.
    pub async fn list_folders(&self, ctx: &RequestContext) -> AppResult<Vec<Folder>> {
        let accessible = self
            .resolver
            .accessible_folder_ids(ctx.user_id, ctx.is_staff)
            .await?;
        if accessible.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = accessible.into_iter().collect();
        self.folder_repo.find_by_ids(&ids).await
    }

    /// Gets a folder by ID. Folders the caller cannot read are reported
    /// as missing.
    pub async fn get_folder(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<Folder> {
        let folder = self
            .folder_repo
            .find_by_id(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;

        let access = self
            .resolver
            .resolve(ctx.user_id, ctx.is_staff, &folder)
            .await?;
        if !access.can_read {
            return Err(AppError::not_found("Folder not found"));
        }

        Ok(folder)
    }

    /// Lists direct children of a folder, paginated.
    pub async fn list_children(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        page: PageRequest,
    ) -> AppResult<PageResponse<Folder>> {
        self.get_folder(ctx, folder_id).await?;
        self.folder_repo.find_children(folder_id, &page).await
    }

    /// Creates a new folder. The owner is always the caller, never
    /// client-supplied.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        req: CreateFolderRequest,
    ) -> AppResult<Folder> {
        let user_id = ctx.require_user()?;

        if req.name.trim().is_empty() {
            return Err(AppError::validation("Folder name cannot be empty"));
        }

        if let Some(parent_id) = req.parent_id {
            let parent = self
                .folder_repo
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| AppError::not_found("Parent folder not found"))?;
            let access = self
                .resolver
                .resolve(ctx.user_id, ctx.is_staff, &parent)
                .await?;
            if !access.can_write {
                return Err(AppError::authorization("No write access to parent folder"));
            }
        } else if self.folder_repo.root_name_exists(&req.name, None).await? {
            return Err(AppError::conflict(format!(
                "A root folder named '{}' already exists",
                req.name
            )));
        }

        let folder = self
            .folder_repo
            .create(&CreateFolder {
                name: req.name,
                owner_id: user_id,
                parent_id: req.parent_id,
            })
            .await?;

        info!(
            user_id = %user_id,
            folder_id = %folder.id,
            name = %folder.name,
            "Folder created"
        );

        Ok(folder)
    }

    /// Renames and/or reparents a folder.
    ///
    /// Requires write access on the folder itself and, when moving, on the
    /// destination parent. Rejects self-parenting and any move that would
    /// place the folder under its own descendant.
    pub async fn update_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        req: UpdateFolderRequest,
    ) -> AppResult<Folder> {
        if req.name.trim().is_empty() {
            return Err(AppError::validation("Folder name cannot be empty"));
        }

        let folder = self
            .folder_repo
            .find_by_id(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;

        if let Some(parent_id) = req.parent_id {
            if parent_id == folder.id {
                return Err(AppError::validation("Folder cannot be its own parent"));
            }

            let parent = self
                .folder_repo
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| AppError::not_found("Parent folder not found"))?;

            // Walking up from the candidate parent must never pass
            // through the folder being moved.
            let parent_chain = self.resolver.ancestor_chain_ids(&parent).await?;
            if parent_chain.contains(&folder.id) {
                return Err(AppError::validation(
                    "Folder cannot be moved under its own descendant",
                ));
            }

            let access = self
                .resolver
                .resolve(ctx.user_id, ctx.is_staff, &parent)
                .await?;
            if !access.can_write {
                return Err(AppError::authorization("No write access to parent folder"));
            }
        } else if self
            .folder_repo
            .root_name_exists(&req.name, Some(folder.id))
            .await?
        {
            return Err(AppError::conflict(format!(
                "A root folder named '{}' already exists",
                req.name
            )));
        }

        self.resolver
            .require_write(ctx.user_id, ctx.is_staff, &folder)
            .await?;

        let updated = self
            .folder_repo
            .update(folder.id, &req.name, req.parent_id)
            .await?;

        info!(
            user_id = ?ctx.user_id,
            folder_id = %folder.id,
            name = %updated.name,
            parent_id = ?updated.parent_id,
            "Folder updated"
        );

        Ok(updated)
    }

    /// Deletes a folder. The store cascades to descendant folders and
    /// every grant attached to them; the single top-level check is
    /// sufficient because the cascade is one atomic store operation.
    pub async fn delete_folder(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<()> {
        let folder = self
            .folder_repo
            .find_by_id(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;

        self.resolver
            .require_write(ctx.user_id, ctx.is_staff, &folder)
            .await?;

        self.folder_repo.delete(folder.id).await?;

        info!(
            user_id = ?ctx.user_id,
            folder_id = %folder.id,
            name = %folder.name,
            "Folder deleted"
        );

        Ok(())
    }
}
