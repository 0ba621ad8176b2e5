//! # waymark-core
//!
//! Core crate for Waymark. Contains configuration schemas, the unified
//! error system, pagination types, tracing setup, and the traits through
//! which the core consumes its external collaborators (team directory,
//! media blob store).
//!
//! This crate has **no** internal dependencies on other Waymark crates.

pub mod config;
pub mod error;
pub mod result;
pub mod telemetry;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
