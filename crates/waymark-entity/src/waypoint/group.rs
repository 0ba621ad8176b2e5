//! Waypoint group entity model and kind enumeration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// How a group's waypoints are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "waypoint_group_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WaypointGroupKind {
    /// A sequenced route; waypoint indices are dense and unique.
    Ordered,
    /// Free-floating points of interest; indices are not maintained.
    Unordered,
    /// Geofence boundary points; indices are not maintained.
    Geofence,
}

impl WaypointGroupKind {
    /// Whether waypoints in this group carry maintained indices.
    pub fn is_ordered(&self) -> bool {
        matches!(self, Self::Ordered)
    }

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ordered => "ordered",
            Self::Unordered => "unordered",
            Self::Geofence => "geofence",
        }
    }
}

impl fmt::Display for WaypointGroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WaypointGroupKind {
    type Err = waymark_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ordered" => Ok(Self::Ordered),
            "unordered" => Ok(Self::Unordered),
            "geofence" => Ok(Self::Geofence),
            _ => Err(waymark_core::AppError::validation(format!(
                "Invalid waypoint group kind: '{s}'. Expected one of: ordered, unordered, geofence"
            ))),
        }
    }
}

/// A named collection of waypoints within an activity.
///
/// Every activity is created with one ordered group (the route) and one
/// unordered group (points of interest); further groups may be added.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WaypointGroup {
    /// Unique group identifier.
    pub id: Uuid,
    /// The owning activity.
    pub activity_id: Uuid,
    /// Group name.
    pub name: Option<String>,
    /// Group kind.
    pub kind: WaypointGroupKind,
    /// When the group was created.
    pub created_at: DateTime<Utc>,
    /// When the group was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new waypoint group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWaypointGroup {
    /// The owning activity.
    pub activity_id: Uuid,
    /// Group name.
    pub name: Option<String>,
    /// Group kind.
    pub kind: WaypointGroupKind,
}
