//! # waymark-auth
//!
//! Access resolution for the folder sharing hierarchy: single-folder
//! read/write resolution, bulk accessible-folder queries, and the
//! authorization predicates for activity and team writes.

pub mod access;

pub use access::activity::ActivityAuthorizer;
pub use access::resolver::FolderAccessResolver;
pub use access::team::TeamAuthorizer;
