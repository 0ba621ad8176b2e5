//! Folder grant domain entities.

pub mod access;
pub mod model;
pub mod principal;

pub use access::{FolderAccess, GrantAccess};
pub use model::{CreateGrant, FolderGrant};
pub use principal::Principal;
