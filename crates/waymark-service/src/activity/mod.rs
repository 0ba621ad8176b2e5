//! Activity services.

pub mod service;

pub use service::{ActivityFilter, ActivityService, CreateActivityRequest};
