//! Request context carrying the authenticated principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use waymark_core::error::AppError;
use waymark_core::result::AppResult;

/// Context for the current request.
///
/// Constructed by the host's authentication middleware and passed into
/// every service method so each operation knows *who* is acting. The core
/// never authenticates; an anonymous context simply resolves to no access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID, or None for anonymous callers.
    pub user_id: Option<Uuid>,
    /// Staff users bypass all folder access checks.
    pub is_staff: bool,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Context for an anonymous (unauthenticated) caller.
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            is_staff: false,
            request_time: Utc::now(),
        }
    }

    /// Context for an authenticated user.
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            is_staff: false,
            request_time: Utc::now(),
        }
    }

    /// Context for an authenticated staff user.
    pub fn staff(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            is_staff: true,
            request_time: Utc::now(),
        }
    }

    /// Whether the caller is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// The authenticated user ID, or an authentication error.
    pub fn require_user(&self) -> AppResult<Uuid> {
        self.user_id
            .ok_or_else(|| AppError::authentication("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_user() {
        assert!(RequestContext::anonymous().require_user().is_err());
        let id = Uuid::new_v4();
        assert_eq!(RequestContext::user(id).require_user().unwrap(), id);
    }
}
