//! Access level enumeration and resolved access value type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access level carried by a folder grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "grant_access", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GrantAccess {
    /// Read-only access.
    Read,
    /// Read and write access.
    Write,
}

impl GrantAccess {
    /// Whether this level permits writes.
    pub fn can_write(&self) -> bool {
        matches!(self, Self::Write)
    }

    /// Return the access level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for GrantAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GrantAccess {
    type Err = waymark_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            _ => Err(waymark_core::AppError::validation(format!(
                "Invalid access level: '{s}'. Expected one of: read, write"
            ))),
        }
    }
}

/// Effective access of a user to a folder.
///
/// Write always implies read; [`FolderAccess`] values never carry
/// `can_write` without `can_read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderAccess {
    /// Whether the user can see the folder and its contents.
    pub can_read: bool,
    /// Whether the user can modify the folder and its contents.
    pub can_write: bool,
}

impl FolderAccess {
    /// No access at all.
    pub fn none() -> Self {
        Self {
            can_read: false,
            can_write: false,
        }
    }

    /// Full access (owner, staff).
    pub fn full() -> Self {
        Self {
            can_read: true,
            can_write: true,
        }
    }

    /// Fold a single grant level into this access value.
    pub fn absorb(&mut self, access: GrantAccess) {
        self.can_read = true;
        if access.can_write() {
            self.can_write = true;
        }
    }

    /// Union of two access values.
    pub fn union(self, other: Self) -> Self {
        Self {
            can_read: self.can_read || other.can_read,
            can_write: self.can_write || other.can_write,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_implies_read() {
        let mut access = FolderAccess::none();
        access.absorb(GrantAccess::Write);
        assert!(access.can_read);
        assert!(access.can_write);
    }

    #[test]
    fn test_read_does_not_imply_write() {
        let mut access = FolderAccess::none();
        access.absorb(GrantAccess::Read);
        assert!(access.can_read);
        assert!(!access.can_write);
    }

    #[test]
    fn test_union() {
        let read = {
            let mut a = FolderAccess::none();
            a.absorb(GrantAccess::Read);
            a
        };
        let write = {
            let mut a = FolderAccess::none();
            a.absorb(GrantAccess::Write);
            a
        };
        assert_eq!(read.union(write), FolderAccess::full());
        assert_eq!(read.union(FolderAccess::none()), read);
    }
}
