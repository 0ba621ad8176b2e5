//! Waypoint entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single geolocated stop.
///
/// In an ordered group the non-null `index` values form a dense
/// zero-based permutation, unique per `(group_id, index)` at every
/// committed state. In unordered and geofence groups the field is stored
/// but carries no ordering meaning.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Waypoint {
    /// Unique waypoint identifier.
    pub id: Uuid,
    /// The owning group.
    pub group_id: Uuid,
    /// Position within an ordered group.
    pub index: Option<i32>,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Waypoint name.
    pub name: String,
    /// Long-form description.
    pub description: Option<String>,
    /// Callout spoken when departing this waypoint.
    pub departure_callout: Option<String>,
    /// Callout spoken when arriving at this waypoint.
    pub arrival_callout: Option<String>,
    /// When the waypoint was created.
    pub created_at: DateTime<Utc>,
    /// When the waypoint was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Replacement field values for an existing waypoint. Index changes are
/// carried separately because they route through the ordering engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateWaypoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Waypoint name.
    pub name: String,
    /// Long-form description.
    pub description: Option<String>,
    /// Departure callout.
    pub departure_callout: Option<String>,
    /// Arrival callout.
    pub arrival_callout: Option<String>,
}

/// Data required to create a new waypoint. The index is never
/// caller-supplied; ordered groups append at the end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWaypoint {
    /// The owning group.
    pub group_id: Uuid,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Waypoint name.
    pub name: String,
    /// Long-form description.
    pub description: Option<String>,
    /// Departure callout.
    pub departure_callout: Option<String>,
    /// Arrival callout.
    pub arrival_callout: Option<String>,
}
