//! Team management authorization.

use std::sync::Arc;

use uuid::Uuid;

use waymark_core::error::AppError;
use waymark_core::result::AppResult;
use waymark_core::traits::MembershipLookup;
use waymark_entity::team::Team;

/// Authorizes team and membership management.
#[derive(Clone)]
pub struct TeamAuthorizer {
    /// Team directory.
    memberships: Arc<dyn MembershipLookup>,
}

impl std::fmt::Debug for TeamAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamAuthorizer").finish()
    }
}

impl TeamAuthorizer {
    /// Creates a new team authorizer.
    pub fn new(memberships: Arc<dyn MembershipLookup>) -> Self {
        Self { memberships }
    }

    /// Whether the user may manage the team: staff, the team owner, or an
    /// admin member.
    pub async fn can_manage(
        &self,
        user_id: Option<Uuid>,
        is_staff: bool,
        team: &Team,
    ) -> AppResult<bool> {
        let Some(user_id) = user_id else {
            return Ok(false);
        };
        if is_staff || team.owner_id == user_id {
            return Ok(true);
        }
        self.memberships.is_admin(user_id, team.id).await
    }

    /// Rejects callers who cannot manage the team.
    pub async fn require_manage(
        &self,
        user_id: Option<Uuid>,
        is_staff: bool,
        team: &Team,
    ) -> AppResult<()> {
        if self.can_manage(user_id, is_staff, team).await? {
            Ok(())
        } else {
            Err(AppError::authorization(
                "No permission to manage team memberships",
            ))
        }
    }
}
