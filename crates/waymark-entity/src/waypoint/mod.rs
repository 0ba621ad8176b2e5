//! Waypoint domain entities: groups, waypoints, and attached media.

pub mod group;
pub mod media;
pub mod model;

pub use group::{CreateWaypointGroup, WaypointGroup, WaypointGroupKind};
pub use media::{CreateWaypointMedia, MediaKind, WaypointMedia};
pub use model::{CreateWaypoint, UpdateWaypoint, Waypoint};
