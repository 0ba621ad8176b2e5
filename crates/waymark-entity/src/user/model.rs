//! User entity model.
//!
//! Authentication is handled outside the core; this record exists so
//! ownership, grants, and memberships have a principal to reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user known to the authoring backend.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Login name (unique).
    pub username: String,
    /// Contact email, if known.
    pub email: Option<String>,
    /// Display name shown in sharing UIs.
    pub display_name: String,
    /// Staff users bypass all folder access checks.
    pub is_staff: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Login name.
    pub username: String,
    /// Contact email.
    pub email: Option<String>,
    /// Display name.
    pub display_name: String,
    /// Whether the user is staff.
    pub is_staff: bool,
}
