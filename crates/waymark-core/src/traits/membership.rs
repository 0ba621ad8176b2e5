//! Team membership lookup trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;

/// Lookup interface for the team directory.
///
/// The access resolver consumes team membership through this trait so the
/// directory can live in the application database or in an external
/// identity provider. The default implementation is backed by the
/// `team_memberships` table in `waymark-database`.
#[async_trait]
pub trait MembershipLookup: Send + Sync + std::fmt::Debug + 'static {
    /// Return the IDs of every team the user belongs to.
    async fn memberships_of(&self, user_id: Uuid) -> AppResult<Vec<Uuid>>;

    /// Whether the user holds an admin membership in the given team.
    async fn is_admin(&self, user_id: Uuid, team_id: Uuid) -> AppResult<bool>;
}
