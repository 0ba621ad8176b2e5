//! Folder access resolution.
//!
//! Resolution order for a single folder:
//! 1. Anonymous callers have no access.
//! 2. Staff bypass — full access to everything.
//! 3. Owner check — folder owners have full access, no grant lookup.
//! 4. Grant union — every grant on the folder's ancestor chain that
//!    applies to the user (directly or via a team) contributes; the result
//!    is the plain union, with no precedence between closer and farther
//!    ancestors or between user and team grants.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use waymark_core::error::AppError;
use waymark_core::result::AppResult;
use waymark_core::traits::MembershipLookup;
use waymark_database::repositories::folder::FolderRepository;
use waymark_database::repositories::grant::GrantRepository;
use waymark_entity::folder::Folder;
use waymark_entity::grant::{FolderAccess, GrantAccess};

use super::MAX_TRAVERSAL_DEPTH;

/// Resolves effective folder access from ownership, staff status, and the
/// grants along the ancestor chain.
#[derive(Clone)]
pub struct FolderAccessResolver {
    /// Folder repository for ancestor and child lookups.
    folder_repo: Arc<FolderRepository>,
    /// Grant repository for resolution lookups.
    grant_repo: Arc<GrantRepository>,
    /// Team directory.
    memberships: Arc<dyn MembershipLookup>,
}

impl std::fmt::Debug for FolderAccessResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderAccessResolver").finish()
    }
}

impl FolderAccessResolver {
    /// Creates a new access resolver.
    pub fn new(
        folder_repo: Arc<FolderRepository>,
        grant_repo: Arc<GrantRepository>,
        memberships: Arc<dyn MembershipLookup>,
    ) -> Self {
        Self {
            folder_repo,
            grant_repo,
            memberships,
        }
    }

    /// Resolves the effective access of a user to a folder.
    pub async fn resolve(
        &self,
        user_id: Option<Uuid>,
        is_staff: bool,
        folder: &Folder,
    ) -> AppResult<FolderAccess> {
        let Some(user_id) = user_id else {
            return Ok(FolderAccess::none());
        };

        if is_staff {
            return Ok(FolderAccess::full());
        }

        if folder.owner_id == user_id {
            return Ok(FolderAccess::full());
        }

        let chain = self.ancestor_chain_ids(folder).await?;
        let team_ids = self.memberships.memberships_of(user_id).await?;
        let grants = self
            .grant_repo
            .find_applicable(&chain, user_id, &team_ids)
            .await?;

        Ok(reduce_access(grants.iter().map(|g| g.access)))
    }

    /// Resolves access and rejects callers without read access.
    pub async fn require_read(
        &self,
        user_id: Option<Uuid>,
        is_staff: bool,
        folder: &Folder,
    ) -> AppResult<FolderAccess> {
        let access = self.resolve(user_id, is_staff, folder).await?;
        if !access.can_read {
            return Err(AppError::authorization("No read access to folder"));
        }
        Ok(access)
    }

    /// Resolves access and rejects callers without write access.
    pub async fn require_write(
        &self,
        user_id: Option<Uuid>,
        is_staff: bool,
        folder: &Folder,
    ) -> AppResult<FolderAccess> {
        let access = self.resolve(user_id, is_staff, folder).await?;
        if !access.can_write {
            return Err(AppError::authorization("No write access to folder"));
        }
        Ok(access)
    }

    /// IDs of every folder the user can read or write.
    ///
    /// Seeds with owned and directly-granted folders, then expands
    /// downward breadth-first: a folder is accessible when any ancestor
    /// is, so each round pulls in the children of the folders found so
    /// far, until no new folder appears.
    pub async fn accessible_folder_ids(
        &self,
        user_id: Option<Uuid>,
        is_staff: bool,
    ) -> AppResult<HashSet<Uuid>> {
        let Some(user_id) = user_id else {
            return Ok(HashSet::new());
        };

        if is_staff {
            return Ok(self.folder_repo.all_ids().await?.into_iter().collect());
        }

        let team_ids = self.memberships.memberships_of(user_id).await?;

        let mut accessible: HashSet<Uuid> = HashSet::new();
        accessible.extend(self.folder_repo.find_owned_ids(user_id).await?);
        accessible.extend(
            self.grant_repo
                .find_granted_folder_ids(user_id, &team_ids)
                .await?,
        );

        let mut frontier: Vec<Uuid> = accessible.iter().copied().collect();
        let mut depth = 0;
        while !frontier.is_empty() && depth < MAX_TRAVERSAL_DEPTH {
            let children = self.folder_repo.find_child_ids(&frontier).await?;
            frontier = children
                .into_iter()
                .filter(|id| accessible.insert(*id))
                .collect();
            depth += 1;
        }

        Ok(accessible)
    }

    /// The folder's ancestor chain, inclusive, from the folder up to its
    /// root. A missing parent row terminates the walk; a repeated ID or
    /// the depth bound aborts it (dirty data, not a normal path).
    ///
    /// Also used by the folder mutation guard to reject reparent cycles.
    pub async fn ancestor_chain_ids(&self, folder: &Folder) -> AppResult<Vec<Uuid>> {
        let mut chain = vec![folder.id];
        let mut visited: HashSet<Uuid> = HashSet::from([folder.id]);
        let mut next_parent = folder.parent_id;

        while let Some(parent_id) = next_parent {
            if !visited.insert(parent_id) || chain.len() >= MAX_TRAVERSAL_DEPTH {
                break;
            }
            match self.folder_repo.find_by_id(parent_id).await? {
                Some(parent) => {
                    chain.push(parent.id);
                    next_parent = parent.parent_id;
                }
                None => break,
            }
        }

        Ok(chain)
    }
}

/// Union of grant levels into an effective access value. Write implies
/// read; any write grant anywhere in the input yields write overall.
pub fn reduce_access(grants: impl Iterator<Item = GrantAccess>) -> FolderAccess {
    let mut access = FolderAccess::none();
    for grant in grants {
        access.absorb(grant);
        if access.can_write {
            break;
        }
    }
    access
}
