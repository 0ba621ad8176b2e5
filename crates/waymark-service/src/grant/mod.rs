//! Folder sharing (grant) services.

pub mod service;

pub use service::{CreateGrantRequest, GrantService};
