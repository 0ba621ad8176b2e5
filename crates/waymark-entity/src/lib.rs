//! # waymark-entity
//!
//! Domain entity models for Waymark. Every struct in this crate represents
//! a database table row or a domain value object. All entities derive
//! `Debug`, `Clone`, `Serialize`, `Deserialize`, and database entities
//! additionally implement `sqlx::FromRow`.

pub mod activity;
pub mod folder;
pub mod grant;
pub mod team;
pub mod user;
pub mod waypoint;
