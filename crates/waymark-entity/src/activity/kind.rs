//! Activity kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of authored activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A timed orienteering route.
    Orienteering,
    /// A narrated guided tour.
    GuidedTour,
}

impl ActivityKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Orienteering => "orienteering",
            Self::GuidedTour => "guided_tour",
        }
    }
}

impl Default for ActivityKind {
    fn default() -> Self {
        Self::Orienteering
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = waymark_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "orienteering" => Ok(Self::Orienteering),
            "guided_tour" => Ok(Self::GuidedTour),
            _ => Err(waymark_core::AppError::validation(format!(
                "Invalid activity kind: '{s}'. Expected one of: orienteering, guided_tour"
            ))),
        }
    }
}
