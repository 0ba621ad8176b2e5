//! Waypoint services: groups, waypoints, attached media, and the
//! ordered-index engine.

pub mod group;
pub mod media;
pub mod ordering;
pub mod service;

pub use group::{CreateGroupRequest, UpdateGroupRequest, WaypointGroupService};
pub use media::{AttachMediaRequest, WaypointMediaService};
pub use service::{CreateWaypointRequest, UpdateWaypointRequest, WaypointService};
