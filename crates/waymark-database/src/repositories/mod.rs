//! Repository implementations for all Waymark entities.

pub mod activity;
pub mod folder;
pub mod grant;
pub mod group;
pub mod media;
pub mod team;
pub mod user;
pub mod waypoint;

pub use activity::ActivityRepository;
pub use folder::FolderRepository;
pub use grant::GrantRepository;
pub use group::WaypointGroupRepository;
pub use media::WaypointMediaRepository;
pub use team::TeamRepository;
pub use user::UserRepository;
pub use waypoint::WaypointRepository;
