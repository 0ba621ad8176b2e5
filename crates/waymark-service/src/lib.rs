//! # waymark-service
//!
//! Business logic service layer for Waymark. Each service is a write
//! gateway: it performs the authorization check for an operation before
//! any storage mutation, then orchestrates repositories and the media
//! store to carry it out.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod activity;
pub mod context;
pub mod folder;
pub mod grant;
pub mod team;
pub mod waypoint;

pub use activity::{ActivityFilter, ActivityService};
pub use context::RequestContext;
pub use folder::FolderService;
pub use grant::GrantService;
pub use team::TeamService;
pub use waypoint::{WaypointGroupService, WaypointMediaService, WaypointService};
