//! Team and membership services.

pub mod service;

pub use service::{AddMemberRequest, TeamService};
